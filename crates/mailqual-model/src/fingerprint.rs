//! File and address fingerprints used by the processing cache (§3, §4.D).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::classification::Classification;

/// Identifies a specific version of a file's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub path: String,
    pub content_hash: String,
    pub size: u64,
    pub mtime: DateTime<Utc>,
    pub row_count: u64,
    pub emitted_row_count: u64,
}

impl FileFingerprint {
    /// The `(path, content_hash)` pair that identifies a processed version
    /// of a file, per §4.D's `was_processed` contract.
    pub fn key(&self) -> (&str, &str) {
        (&self.path, &self.content_hash)
    }
}

/// Records that an address was classified by a prior run, for cross-file
/// and cross-run deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorAddressOutcome {
    pub address: Address,
    pub classification: Classification,
    pub source_fingerprint: String,
    pub processed_at: DateTime<Utc>,
}
