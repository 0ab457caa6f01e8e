#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod exclusions;
pub mod output;
pub mod scoring;

pub use crate::config::{load_from_path, load_from_str};
pub use crate::engine::{FilterCounts, FilterEngine, FilterRunResult};
pub use crate::error::{FilterError, Result};
pub use crate::output::FilterOutputPaths;
pub use crate::scoring::ScoringEngine;
