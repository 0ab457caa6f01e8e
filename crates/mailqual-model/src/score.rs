//! Scoring result types for the Smart Filter Engine (§3, §4.G).
//!
//! The engine itself lives in `mailqual-filter`; these are the shared output
//! types so the writer and CLI can consume them without depending on the
//! scoring engine crate.

use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Priority tier assigned by the Smart Filter Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Excluded,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::Excluded => "EXCLUDED",
        };
        f.write_str(s)
    }
}

/// One component contributing to a [`ScoreResult`]'s `raw_score`, kept for
/// explainability in the exclusion/score report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: &'static str,
    pub value: f64,
    pub description: String,
}

/// The four weighted component subscores plus any applied bonuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub email_quality: f64,
    pub company_relevance: f64,
    pub geographic_priority: f64,
    pub engagement: f64,
    pub applied_bonuses: Vec<ScoreComponent>,
    /// Product of `applied_bonuses`' multipliers, already capped at the
    /// config's `bonus_cap` — the same value used to derive `final_score`.
    pub bonus_product: f64,
}

impl Default for ScoreBreakdown {
    fn default() -> Self {
        Self {
            email_quality: 0.0,
            company_relevance: 0.0,
            geographic_priority: 0.0,
            engagement: 0.0,
            applied_bonuses: Vec::new(),
            bonus_product: 1.0,
        }
    }
}

/// Per-address Smart Filter result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    pub address: Address,
    pub raw_score: f64,
    pub final_score: f64,
    pub priority: Priority,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub exclusion_reasons: Vec<String>,
}
