use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidateError {
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },
}

pub type Result<T> = std::result::Result<T, ValidateError>;
