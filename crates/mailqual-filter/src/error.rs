use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FilterError {
    #[error("could not read config {path}: {source}")]
    ConfigIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Raised by [`crate::config::validate`] before any I/O begins, per §4.G.
    #[error("invalid filter config: {which_check}")]
    InvalidConfig { which_check: String },

    #[error("could not read clean-addresses file {path}: {source}")]
    InputIo {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata store error: {0}")]
    Store(#[from] mailqual_store::StoreError),

    #[error("result writer error: {0}")]
    Output(#[from] mailqual_output::OutputError),

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FilterError>;
