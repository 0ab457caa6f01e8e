#![deny(unsafe_code)]

pub mod error;
pub mod metadata_sidecar;
pub mod summary;
pub mod writer;

pub use crate::error::{OutputError, Result};
pub use crate::summary::RunSummary;
pub use crate::writer::{AtomicFileWriter, sweep_temporaries};
