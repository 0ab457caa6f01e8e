//! Loading and validating a [`FilterConfig`] (§4.G, §6): "the validation in
//! §4.G must apply before I/O." [`load_from_path`] never opens the clean
//! file or writes an output until [`validate`] has passed.

use std::path::Path;

use mailqual_model::filter_config::MANDATORY_EXCLUSION_CATEGORIES;
use mailqual_model::FilterConfig;

use crate::error::{FilterError, Result};

const MIN_DOMAIN_PATTERNS: usize = 5;
const MIN_EMAIL_PREFIXES: usize = 3;
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn load_from_path(path: &Path) -> Result<FilterConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| FilterError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&raw)
}

pub fn load_from_str(raw: &str) -> Result<FilterConfig> {
    let config: FilterConfig = toml::from_str(raw)?;
    validate(&config)?;
    Ok(config)
}

/// The four checks named in §4.G's `InvalidConfig{which_check}` contract,
/// in the order the spec lists them, plus a regex-compiles check so a
/// malformed `suspicious_regex` fails here rather than mid-run.
fn validate(config: &FilterConfig) -> Result<()> {
    for category in MANDATORY_EXCLUSION_CATEGORIES {
        let Some(entry) = config.exclusions.get(category) else {
            return Err(invalid(format!("missing mandatory exclusion category: {category}")));
        };
        if entry.domain_patterns.len() < MIN_DOMAIN_PATTERNS {
            return Err(invalid(format!(
                "exclusion category '{category}' has fewer than {MIN_DOMAIN_PATTERNS} domain_patterns"
            )));
        }
        if entry.email_prefixes.len() < MIN_EMAIL_PREFIXES {
            return Err(invalid(format!(
                "exclusion category '{category}' has fewer than {MIN_EMAIL_PREFIXES} email_prefixes"
            )));
        }
    }

    let weight_sum = config.weights.sum();
    if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(invalid(format!("weights sum to {weight_sum}, not 1.0")));
    }

    let t = &config.thresholds;
    if !(t.high > t.medium && t.medium > t.low && t.low >= 0) {
        return Err(invalid(format!(
            "thresholds out of order: high={}, medium={}, low={}",
            t.high, t.medium, t.low
        )));
    }

    for bonus in &config.bonus_multipliers {
        if bonus.multiplier <= 0.0 {
            return Err(invalid(format!(
                "bonus multiplier '{}' is non-positive: {}",
                bonus.name, bonus.multiplier
            )));
        }
    }
    if config.bonus_cap <= 0.0 {
        return Err(invalid(format!("bonus_cap must be positive, got {}", config.bonus_cap)));
    }

    for pattern in &config.suspicious_regexes {
        if let Err(source) = regex::Regex::new(pattern) {
            return Err(invalid(format!("invalid suspicious_regex '{pattern}': {source}")));
        }
    }

    Ok(())
}

fn invalid(which_check: String) -> FilterError {
    FilterError::InvalidConfig { which_check }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_category() -> String {
        r#"
        domain_patterns = ["one", "two", "three", "four", "five"]
        email_prefixes = ["a", "b", "c"]
        "#
        .to_string()
    }

    fn well_formed_toml() -> String {
        let category = base_category();
        format!(
            r#"
            name = "test"
            version = "1"

            [weights]
            email_quality = 0.25
            company_relevance = 0.25
            geographic_priority = 0.25
            engagement = 0.25

            [thresholds]
            high = 80
            medium = 50
            low = 20

            [industry_keywords]
            [geographic_priorities]

            [exclusions.medical]
            {category}
            [exclusions.educational]
            {category}
            [exclusions.government]
            {category}
            [exclusions.pharmacy]
            {category}
            [exclusions.legal]
            {category}
            [exclusions.tourism]
            {category}
            [exclusions.research_ngo]
            {category}
            "#
        )
    }

    #[test]
    fn well_formed_config_loads() {
        load_from_str(&well_formed_toml()).unwrap();
    }

    #[test]
    fn missing_mandatory_category_rejected() {
        let without_legal = well_formed_toml().replace("[exclusions.legal]", "[exclusions.not_legal]");
        let err = load_from_str(&without_legal).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig { .. }));
    }

    #[test]
    fn weights_not_summing_to_one_rejected() {
        let bad = well_formed_toml().replace("engagement = 0.25", "engagement = 0.30");
        let err = load_from_str(&bad).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig { .. }));
    }

    #[test]
    fn thresholds_out_of_order_rejected() {
        let bad = well_formed_toml().replace("high = 80", "high = 10");
        let err = load_from_str(&bad).unwrap_err();
        assert!(matches!(err, FilterError::InvalidConfig { .. }));
    }
}
