//! One input row.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;

/// One row read from an input file: a raw (not yet normalized) address
/// token plus optional metadata. Readers (§4.E) never normalize or
/// validate; that happens in the pipeline's per-record algorithm (§4.F
/// step a), which is the only place a [`crate::Address`] gets constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub raw_address: String,
    pub source_file: String,
    pub source_row: u64,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Record {
    pub fn new(raw_address: impl Into<String>, source_file: impl Into<String>, source_row: u64) -> Self {
        Self {
            raw_address: raw_address.into(),
            source_file: source_file.into(),
            source_row,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
