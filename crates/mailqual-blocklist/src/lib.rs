#![deny(unsafe_code)]

pub mod error;
pub mod history;
pub mod import;
pub mod service;
pub mod snapshot;
pub mod store;

pub use crate::error::{BlocklistError, Result};
pub use crate::import::ImportPolicy;
pub use crate::service::{BlocklistService, BlocklistStats};
pub use crate::snapshot::BlocklistSnapshot;
