//! `BatchResult`/`ProcessResult` — the output of `process_batch` (§4.F, §6).

use std::collections::BTreeMap;
use std::time::Duration;

use mailqual_model::Classification;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Processed,
    SkippedCached,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub path: String,
    pub status: FileStatus,
    pub counts: BTreeMap<Classification, u64>,
    pub duplicates_suppressed: u64,
    pub errors: Vec<String>,
}

impl ProcessResult {
    pub fn records_read(&self) -> u64 {
        self.counts.values().sum::<u64>() + self.duplicates_suppressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    PartialFailure,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub files: Vec<ProcessResult>,
    pub totals: BTreeMap<Classification, u64>,
    pub duplicates_suppressed: u64,
    pub wall_time: Duration,
    pub partial_failure: bool,
}

impl BatchResult {
    pub fn from_files(files: Vec<ProcessResult>, wall_time: Duration, cancelled: bool) -> Self {
        let mut totals: BTreeMap<Classification, u64> = BTreeMap::new();
        let mut duplicates_suppressed = 0;
        let mut any_failed = false;
        for file in &files {
            for (classification, count) in &file.counts {
                *totals.entry(*classification).or_insert(0) += count;
            }
            duplicates_suppressed += file.duplicates_suppressed;
            if file.status == FileStatus::Failed {
                any_failed = true;
            }
        }
        let status = if cancelled {
            BatchStatus::Cancelled
        } else if any_failed {
            BatchStatus::PartialFailure
        } else {
            BatchStatus::Completed
        };
        Self {
            status,
            files,
            totals,
            duplicates_suppressed,
            wall_time,
            partial_failure: any_failed,
        }
    }
}
