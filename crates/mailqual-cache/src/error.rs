use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// Surfaced to the pipeline, which forces a rebuild on next run and
    /// emits a non-fatal warning (§4.D).
    #[error("processing cache corrupt: {0}")]
    CacheCorrupt(String),

    #[error("processing cache store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;
