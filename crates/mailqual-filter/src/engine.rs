//! Orchestrates the Smart Filter Engine end to end (§4.G): read the clean
//! file, check hard exclusions, score survivors, assign priority tiers, and
//! hand the results to [`crate::output`].

use std::io::BufRead;
use std::path::Path;

use mailqual_model::{Address, FilterConfig, Priority, ScoreResult};
use mailqual_store::MetadataStore;
use regex::Regex;
use tracing::warn;

use crate::error::{FilterError, Result};
use crate::exclusions;
use crate::output::{self, FilterOutputPaths};
use crate::scoring::ScoringEngine;

pub struct FilterEngine {
    config: FilterConfig,
    suspicious: Vec<Regex>,
}

#[derive(Debug, Clone, Default)]
pub struct FilterCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub excluded: usize,
}

pub struct FilterRunResult {
    pub counts: FilterCounts,
    pub paths: FilterOutputPaths,
}

impl FilterEngine {
    /// `config` must already have passed [`crate::config::load_from_path`]
    /// (or `load_from_str`); this constructor does not re-validate.
    pub fn new(config: FilterConfig) -> Self {
        let suspicious = config
            .suspicious_regexes
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();
        Self { config, suspicious }
    }

    pub fn run(
        &self,
        clean_addresses_path: &Path,
        store: &MetadataStore,
        output_dir: &Path,
        run_tag: &str,
    ) -> Result<FilterRunResult> {
        let addresses = read_clean_addresses(clean_addresses_path)?;
        let scoring = ScoringEngine::new(&self.config);

        let mut results = Vec::with_capacity(addresses.len());
        let mut counts = FilterCounts::default();
        for address in addresses {
            let reasons = exclusions::check(&address, &self.config, &self.suspicious);
            let result = if !reasons.is_empty() {
                counts.excluded += 1;
                ScoreResult {
                    address,
                    raw_score: 0.0,
                    final_score: 0.0,
                    priority: Priority::Excluded,
                    breakdown: Default::default(),
                    exclusion_reasons: reasons,
                }
            } else {
                let metadata = store.get(&address)?;
                let mut breakdown = scoring.score(&address, metadata.as_ref());
                breakdown.applied_bonuses = scoring.applied_bonuses(&address, metadata.as_ref());
                let bonus_product = scoring.bonus_product(&breakdown.applied_bonuses);
                breakdown.bonus_product = bonus_product;
                let raw_score = scoring.raw_score(&breakdown);
                let final_score = raw_score * bonus_product;
                let priority = assign_priority(final_score, &self.config.thresholds);
                match priority {
                    Priority::High => counts.high += 1,
                    Priority::Medium => counts.medium += 1,
                    Priority::Low => counts.low += 1,
                    Priority::Excluded => counts.excluded += 1,
                }
                let exclusion_reasons = if priority == Priority::Excluded {
                    vec!["below-threshold".to_string()]
                } else {
                    Vec::new()
                };
                ScoreResult {
                    address,
                    raw_score,
                    final_score,
                    priority,
                    breakdown,
                    exclusion_reasons,
                }
            };
            results.push(result);
        }

        let paths = output::write_all(output_dir, run_tag, &results)?;
        Ok(FilterRunResult { counts, paths })
    }
}

fn assign_priority(final_score: f64, thresholds: &mailqual_model::filter_config::Thresholds) -> Priority {
    if final_score >= thresholds.high as f64 {
        Priority::High
    } else if final_score >= thresholds.medium as f64 {
        Priority::Medium
    } else if final_score >= thresholds.low as f64 {
        Priority::Low
    } else {
        Priority::Excluded
    }
}

fn read_clean_addresses(path: &Path) -> Result<Vec<Address>> {
    let file = std::fs::File::open(path).map_err(|source| FilterError::InputIo {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);
    let mut addresses = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| FilterError::InputIo {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match Address::parse(trimmed) {
            Ok(address) => addresses.push(address),
            Err(error) => warn!(line = trimmed, %error, "skipping malformed line in clean-addresses file"),
        }
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailqual_model::filter_config::{ExclusionCategory, Thresholds, Weights};
    use std::collections::{BTreeMap, BTreeSet};

    fn minimal_config() -> FilterConfig {
        let mut exclusions = BTreeMap::new();
        for category in mailqual_model::filter_config::MANDATORY_EXCLUSION_CATEGORIES {
            exclusions.insert(
                category.to_string(),
                ExclusionCategory {
                    domain_patterns: ["p1", "p2", "p3", "p4", "p5"].iter().map(|s| s.to_string()).collect(),
                    email_prefixes: ["e1", "e2", "e3"].iter().map(|s| s.to_string()).collect(),
                    keywords: BTreeSet::new(),
                },
            );
        }
        FilterConfig {
            name: "t".into(),
            version: "1".into(),
            target_country: None,
            target_industry: None,
            language_codes: Vec::new(),
            weights: Weights {
                email_quality: 0.25,
                company_relevance: 0.25,
                geographic_priority: 0.25,
                engagement: 0.25,
            },
            thresholds: Thresholds { high: 80, medium: 50, low: 20 },
            industry_keywords: Default::default(),
            geographic_priorities: Default::default(),
            exclusions,
            personal_domains: ["gmail.com".to_string()].into_iter().collect(),
            service_prefixes: BTreeSet::new(),
            excluded_country_domains: BTreeSet::new(),
            suspicious_regexes: Vec::new(),
            role_prefixes: BTreeSet::new(),
            bonus_multipliers: Vec::new(),
            bonus_cap: 3.0,
        }
    }

    #[test]
    fn personal_domain_is_excluded_and_skips_scoring() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.txt");
        std::fs::write(&clean, "alice@gmail.com\nbob@acme.io\n").unwrap();

        let store = MetadataStore::in_memory().unwrap();
        let engine = FilterEngine::new(minimal_config());
        let result = engine.run(&clean, &store, dir.path(), "tag").unwrap();

        assert_eq!(result.counts.excluded, 1);
        let excluded_contents = std::fs::read_to_string(&result.paths.excluded).unwrap();
        assert!(excluded_contents.contains("alice@gmail.com"));
    }

    #[test]
    fn below_threshold_clean_address_lands_in_excluded_with_reason() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.txt");
        // Short local part on a built-in personal-provider domain: email
        // quality bottoms out at 0, engagement at its 60 baseline with no
        // stored metadata, so raw_score = 0.25*60 = 15, below the low
        // threshold of 20.
        std::fs::write(&clean, "bo@yahoo.com\n").unwrap();

        let store = MetadataStore::in_memory().unwrap();
        let engine = FilterEngine::new(minimal_config());
        let result = engine.run(&clean, &store, dir.path(), "tag").unwrap();

        assert_eq!(result.counts.excluded, 1);
        let report = std::fs::read_to_string(&result.paths.report).unwrap();
        assert!(report.contains("below-threshold"));
    }

    #[test]
    fn malformed_line_in_clean_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.txt");
        std::fs::write(&clean, "not-an-email\nbob@acme.io\n").unwrap();

        let store = MetadataStore::in_memory().unwrap();
        let engine = FilterEngine::new(minimal_config());
        let result = engine.run(&clean, &store, dir.path(), "tag").unwrap();
        assert_eq!(result.counts.high + result.counts.medium + result.counts.low + result.counts.excluded, 1);
    }
}
