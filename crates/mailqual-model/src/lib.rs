#![deny(unsafe_code)]

pub mod address;
pub mod blocklist;
pub mod classification;
pub mod error;
pub mod filter_config;
pub mod fingerprint;
pub mod metadata;
pub mod record;
pub mod score;

pub use crate::address::Address;
pub use crate::blocklist::{BlocklistEntry, BlocklistEvent, BlocklistOperation};
pub use crate::classification::Classification;
pub use crate::error::{MailqualError, Result};
pub use crate::filter_config::{
    ExclusionCategory, FilterConfig, GeographicPriorities, IndustryKeywords, Thresholds, Weights,
};
pub use crate::fingerprint::{FileFingerprint, PriorAddressOutcome};
pub use crate::metadata::Metadata;
pub use crate::record::Record;
pub use crate::score::{Priority, ScoreBreakdown, ScoreComponent, ScoreResult};
