#![deny(unsafe_code)]

pub mod cancellation;
pub mod error;
pub mod fingerprint;
pub mod options;
pub mod pipeline;
pub mod progress;
pub mod result;

pub use crate::cancellation::CancellationToken;
pub use crate::error::{PipelineError, Result};
pub use crate::options::{DeduplicateMode, ProcessOptions};
pub use crate::pipeline::Pipeline;
pub use crate::progress::{BatchProgress, EwmaRate, FileProgress, ProgressDispatcher, ProgressEvent};
pub use crate::result::{BatchResult, BatchStatus, FileStatus, ProcessResult};
