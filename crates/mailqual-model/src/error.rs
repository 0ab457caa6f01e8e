//! Crate-wide error type for the shared data model.
//!
//! Component crates (validate, blocklist, store, ...) define their own
//! error enums; this one covers invariant violations in the model types
//! themselves (e.g. constructing an [`crate::Address`] from a bad string).

use thiserror::Error;

/// Error type for model-level invariant violations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MailqualError {
    /// An address string failed the §3 invariants.
    #[error("invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// A filter configuration failed structural or semantic validation.
    #[error("invalid filter config: {which_check}")]
    InvalidConfig { which_check: String },
}

/// Result type alias using [`MailqualError`].
pub type Result<T> = std::result::Result<T, MailqualError>;
