//! Per-field provenance tracking for the metadata store (§4.C: "every field
//! write records `(source_file_id, observed_at)`").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub source_file_id: String,
    pub observed_at: DateTime<Utc>,
}

/// Field-name -> provenance map for one address, carried alongside the
/// merged [`mailqual_model::Metadata`] row.
pub type ProvenanceMap = BTreeMap<String, ProvenanceEntry>;

/// Merge `incoming` into `existing`, field by field, per §4.C's policy: a
/// non-empty incoming value overwrites the existing one only if `incoming`
/// is strictly newer by `observed_at`; ties keep the existing value.
pub fn should_overwrite(existing: Option<&ProvenanceEntry>, incoming: &ProvenanceEntry) -> bool {
    match existing {
        None => true,
        Some(existing) => incoming.observed_at > existing.observed_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(secs: i64) -> ProvenanceEntry {
        ProvenanceEntry {
            source_file_id: "f".to_string(),
            observed_at: DateTime::from_timestamp(secs, 0).unwrap(),
        }
    }

    #[test]
    fn newer_overwrites_older() {
        assert!(should_overwrite(Some(&entry(10)), &entry(20)));
    }

    #[test]
    fn older_does_not_overwrite_newer() {
        assert!(!should_overwrite(Some(&entry(20)), &entry(10)));
    }

    #[test]
    fn tie_does_not_overwrite() {
        assert!(!should_overwrite(Some(&entry(10)), &entry(10)));
    }

    #[test]
    fn absent_field_is_always_written() {
        assert!(should_overwrite(None, &entry(1)));
    }
}
