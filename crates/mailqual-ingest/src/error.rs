use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("failed to read {path} at row {row}: {cause}")]
    ReadError {
        path: PathBuf,
        row: u64,
        cause: String,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
