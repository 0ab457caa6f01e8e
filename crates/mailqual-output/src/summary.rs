//! Per-run summary JSON: `{counts, timings, config_snapshot}` (§4.H, §6).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mailqual_model::Classification;
use serde::Serialize;

use crate::error::Result;
use crate::writer::AtomicFileWriter;

#[derive(Debug, Clone, Serialize)]
pub struct SummaryCounts {
    pub by_classification: BTreeMap<Classification, u64>,
    pub duplicates_suppressed: u64,
    pub files_processed: usize,
    pub files_skipped_cached: usize,
    pub files_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryTimings {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub wall_time_secs: f64,
}

/// Snapshot of the options a run was invoked with, for reproducibility.
/// Kept as a loose JSON value rather than a typed struct so callers from
/// `mailqual-cli` or `mailqual-filter` can attach whichever options their
/// operation actually took without this crate knowing their shape.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub counts: SummaryCounts,
    pub timings: SummaryTimings,
    pub config_snapshot: serde_json::Value,
}

impl RunSummary {
    pub fn write(&self, dir: &Path, filename: &str) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(self)?;
        AtomicFileWriter::write_bytes(dir, filename, json.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut by_classification = BTreeMap::new();
        by_classification.insert(Classification::Clean, 3);
        let summary = RunSummary {
            counts: SummaryCounts {
                by_classification,
                duplicates_suppressed: 1,
                files_processed: 2,
                files_skipped_cached: 0,
                files_failed: 0,
            },
            timings: SummaryTimings {
                started_at: Utc::now(),
                finished_at: Utc::now(),
                wall_time_secs: 0.5,
            },
            config_snapshot: serde_json::json!({ "worker_count": 4 }),
        };
        let path = summary.write(dir.path(), "summary.json").unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"duplicates_suppressed\": 1"));
        assert!(contents.contains("worker_count"));
    }
}
