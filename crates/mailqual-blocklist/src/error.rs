use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BlocklistError {
    #[error("entry already present: {target}")]
    DuplicateEntry { target: String },

    #[error("entry not found: {target}")]
    NotFound { target: String },

    #[error("malformed blocklist entry at row {row}: {message}")]
    MalformedEntry { row: u64, message: String },

    #[error("history is empty, nothing to undo/redo")]
    HistoryEmpty,

    #[error("failed to read blocklist log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blocklist store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("failed to parse blocklist csv row: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BlocklistError>;
