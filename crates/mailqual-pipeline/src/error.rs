use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("record read error: {0}")]
    Ingest(#[from] mailqual_ingest::IngestError),

    #[error("blocklist error: {0}")]
    Blocklist(#[from] mailqual_blocklist::BlocklistError),

    #[error("metadata store error: {0}")]
    Store(#[from] mailqual_store::StoreError),

    #[error("processing cache error, batch aborted: {0}")]
    CacheAborted(#[from] mailqual_cache::CacheError),

    #[error("result writer error: {0}")]
    Output(#[from] mailqual_output::OutputError),

    #[error("failed to fingerprint {path}: {source}")]
    Fingerprint {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run was cancelled")]
    Cancelled,

    #[error("a pipeline task panicked: {0}")]
    TaskPanicked(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
