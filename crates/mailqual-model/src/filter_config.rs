//! [`FilterConfig`]: the Smart Filter Engine's configuration document (§3).
//!
//! Structural shape only — semantic validation (weights summing to 1.0,
//! threshold ordering, mandatory exclusion categories) lives in
//! `mailqual-filter`, which is the component that must reject a bad config
//! before any I/O begins.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The seven exclusion categories that §3/§9 require every config to carry.
pub const MANDATORY_EXCLUSION_CATEGORIES: [&str; 7] = [
    "medical",
    "educational",
    "government",
    "pharmacy",
    "legal",
    "tourism",
    "research_ngo",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub target_country: Option<String>,
    #[serde(default)]
    pub target_industry: Option<String>,
    #[serde(default)]
    pub language_codes: Vec<String>,

    pub weights: Weights,
    pub thresholds: Thresholds,
    pub industry_keywords: IndustryKeywords,
    pub geographic_priorities: GeographicPriorities,

    /// Keyed by one of [`MANDATORY_EXCLUSION_CATEGORIES`]; a config must
    /// contain every key to pass loading.
    pub exclusions: std::collections::BTreeMap<String, ExclusionCategory>,

    #[serde(default)]
    pub personal_domains: BTreeSet<String>,
    #[serde(default)]
    pub service_prefixes: BTreeSet<String>,
    #[serde(default)]
    pub excluded_country_domains: BTreeSet<String>,
    #[serde(default)]
    pub suspicious_regexes: Vec<String>,

    #[serde(default)]
    pub role_prefixes: BTreeSet<String>,
    #[serde(default)]
    pub bonus_multipliers: Vec<BonusMultiplier>,
    #[serde(default = "default_bonus_cap")]
    pub bonus_cap: f64,
}

fn default_bonus_cap() -> f64 {
    3.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    pub email_quality: f64,
    pub company_relevance: f64,
    pub geographic_priority: f64,
    pub engagement: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.email_quality + self.company_relevance + self.geographic_priority + self.engagement
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Thresholds {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndustryKeywords {
    #[serde(default)]
    pub primary: BTreeSet<String>,
    #[serde(default)]
    pub secondary: BTreeSet<String>,
    #[serde(default)]
    pub processes: BTreeSet<String>,
    #[serde(default)]
    pub materials: BTreeSet<String>,
    #[serde(default)]
    pub negative: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeographicPriorities {
    #[serde(default)]
    pub high: BTreeSet<String>,
    #[serde(default)]
    pub medium: BTreeSet<String>,
    #[serde(default)]
    pub low: BTreeSet<String>,
}

/// One of the seven mandatory exclusion categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExclusionCategory {
    pub domain_patterns: BTreeSet<String>,
    pub email_prefixes: BTreeSet<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusMultiplier {
    pub name: String,
    pub multiplier: f64,
}
