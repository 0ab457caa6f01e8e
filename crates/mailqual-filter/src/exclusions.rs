//! Hard exclusions (§4.G): checked before scoring; any hit classifies the
//! address EXCLUDED and is recorded as a reason. All matching categories are
//! collected, not just the first.

use mailqual_model::{Address, FilterConfig};
use regex::Regex;

/// Returns the exclusion reasons that fired for `address`, empty if none.
pub fn check(address: &Address, config: &FilterConfig, suspicious: &[Regex]) -> Vec<String> {
    let mut reasons = Vec::new();
    let local = address.local_part().to_ascii_lowercase();
    let domain = address.domain().to_ascii_lowercase();
    let tld = address.tld().to_ascii_lowercase();
    let full = address.as_str();

    if config
        .service_prefixes
        .iter()
        .any(|p| local.starts_with(p.to_ascii_lowercase().as_str()))
    {
        reasons.push(format!("service_prefix:{local}"));
    }
    for (category, entry) in &config.exclusions {
        if entry
            .email_prefixes
            .iter()
            .any(|p| local.starts_with(p.to_ascii_lowercase().as_str()))
        {
            reasons.push(format!("{category}_prefix:{local}"));
        }
    }

    if config.personal_domains.iter().any(|d| d.eq_ignore_ascii_case(&domain)) {
        reasons.push(format!("personal_domain:{domain}"));
    }

    if config.excluded_country_domains.iter().any(|t| t.eq_ignore_ascii_case(&tld)) {
        reasons.push(format!("excluded_country_domain:{tld}"));
    }

    for (category, entry) in &config.exclusions {
        for pattern in &entry.domain_patterns {
            if domain.contains(&pattern.to_ascii_lowercase()) {
                reasons.push(format!("{category}_domain_pattern:{pattern}"));
            }
        }
    }

    for (pattern, compiled) in config.suspicious_regexes.iter().zip(suspicious) {
        if is_full_match(compiled, full) {
            reasons.push(format!("suspicious_regex:{pattern}"));
        }
    }

    reasons
}

fn is_full_match(regex: &Regex, haystack: &str) -> bool {
    regex
        .find(haystack)
        .is_some_and(|m| m.start() == 0 && m.end() == haystack.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailqual_model::filter_config::ExclusionCategory;
    use std::collections::{BTreeMap, BTreeSet};

    fn config_with(
        service_prefixes: &[&str],
        personal_domains: &[&str],
        excluded_country_domains: &[&str],
        category_patterns: &[&str],
    ) -> FilterConfig {
        let mut exclusions = BTreeMap::new();
        exclusions.insert(
            "medical".to_string(),
            ExclusionCategory {
                domain_patterns: category_patterns.iter().map(|s| s.to_string()).collect(),
                email_prefixes: BTreeSet::new(),
                keywords: BTreeSet::new(),
            },
        );
        FilterConfig {
            name: "t".into(),
            version: "1".into(),
            target_country: None,
            target_industry: None,
            language_codes: Vec::new(),
            weights: mailqual_model::filter_config::Weights {
                email_quality: 0.25,
                company_relevance: 0.25,
                geographic_priority: 0.25,
                engagement: 0.25,
            },
            thresholds: mailqual_model::filter_config::Thresholds { high: 80, medium: 50, low: 20 },
            industry_keywords: Default::default(),
            geographic_priorities: Default::default(),
            exclusions,
            personal_domains: personal_domains.iter().map(|s| s.to_string()).collect(),
            service_prefixes: service_prefixes.iter().map(|s| s.to_string()).collect(),
            excluded_country_domains: excluded_country_domains.iter().map(|s| s.to_string()).collect(),
            suspicious_regexes: Vec::new(),
            role_prefixes: BTreeSet::new(),
            bonus_multipliers: Vec::new(),
            bonus_cap: 3.0,
        }
    }

    #[test]
    fn service_prefix_excludes() {
        let config = config_with(&["noreply"], &[], &[], &[]);
        let address = Address::parse("noreply@example.com").unwrap();
        let reasons = check(&address, &config, &[]);
        assert!(reasons.iter().any(|r| r.starts_with("service_prefix:")));
    }

    #[test]
    fn service_prefix_matches_as_prefix_not_exact() {
        let config = config_with(&["admin"], &[], &[], &[]);
        let address = Address::parse("admin123@example.com").unwrap();
        let reasons = check(&address, &config, &[]);
        assert!(reasons.iter().any(|r| r.starts_with("service_prefix:")));
    }

    #[test]
    fn personal_domain_excludes() {
        let config = config_with(&[], &["gmail.com"], &[], &[]);
        let address = Address::parse("alice@gmail.com").unwrap();
        let reasons = check(&address, &config, &[]);
        assert!(reasons.iter().any(|r| r.starts_with("personal_domain:")));
    }

    #[test]
    fn domain_pattern_substring_excludes() {
        let config = config_with(&[], &[], &[], &["hospital"]);
        let address = Address::parse("a@cityhospital.org").unwrap();
        let reasons = check(&address, &config, &[]);
        assert!(reasons.iter().any(|r| r.starts_with("medical_domain_pattern:")));
    }

    #[test]
    fn clean_address_has_no_reasons() {
        let config = config_with(&["noreply"], &["gmail.com"], &["ru"], &["hospital"]);
        let address = Address::parse("alice@acme.io").unwrap();
        assert!(check(&address, &config, &[]).is_empty());
    }
}
