#![deny(unsafe_code)]

pub mod cache;
pub mod error;

pub use crate::cache::{DedupeScope, ProcessingCache};
pub use crate::error::{CacheError, Result};
