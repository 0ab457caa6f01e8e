//! Compute a [`mailqual_model::FileFingerprint`] for a path (§3, §4.F step 1).

use std::path::Path;

use chrono::{DateTime, Utc};
use mailqual_model::FileFingerprint;

use crate::error::{PipelineError, Result};

pub fn fingerprint(path: &Path) -> Result<FileFingerprint> {
    let bytes = std::fs::read(path).map_err(|source| PipelineError::Fingerprint {
        path: path.to_path_buf(),
        source,
    })?;
    let metadata = std::fs::metadata(path).map_err(|source| PipelineError::Fingerprint {
        path: path.to_path_buf(),
        source,
    })?;
    let mtime: DateTime<Utc> = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Ok(FileFingerprint {
        path: path.display().to_string(),
        content_hash: mailqual_common::sha256_hex(&bytes),
        size: metadata.len(),
        mtime,
        row_count: 0,
        emitted_row_count: 0,
    })
}
