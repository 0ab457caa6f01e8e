use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("metadata store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("malformed metadata for {address}: {message}")]
    MalformedMetadata { address: String, message: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;
