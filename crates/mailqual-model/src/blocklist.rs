//! Blocklist entries and the mutation-history event log (§4.B).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in a blocklist: either an exact email or a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlocklistEntry {
    pub target: String,
    #[serde(default)]
    pub note: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// The kind of mutation recorded in the history ring buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlocklistOperation {
    AddEmail,
    AddDomain,
    RemoveEmail,
    RemoveDomain,
}

/// One history record, enough to undo or redo the mutation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocklistEvent {
    pub timestamp: DateTime<Utc>,
    pub operation: BlocklistOperation,
    pub target: String,
    pub note: Option<String>,
    pub before_count: usize,
    pub after_count: usize,
}
