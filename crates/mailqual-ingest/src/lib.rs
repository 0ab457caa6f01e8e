#![deny(unsafe_code)]

pub mod error;
pub mod plain_text;
pub mod structured;

pub use crate::error::{IngestError, Result};
pub use crate::plain_text::PlainTextReader;
pub use crate::structured::StructuredReader;

/// A reader that lazily yields one [`mailqual_model::Record`] at a time.
/// Both reader variants (§4.E) implement this; neither retains state beyond
/// the current record, so either is safe to run inside a worker task.
pub trait RecordReader {
    fn next_record(&mut self) -> Option<Result<mailqual_model::Record>>;
}
