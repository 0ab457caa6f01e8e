//! Address classification, mutually exclusive per §3.

use serde::{Deserialize, Serialize};

/// The outcome of running an address through validation and the blocklist.
///
/// Precedence when multiple rules could apply (§4.F): `Invalid` >
/// `BlockedEmail` > `BlockedDomain` > `Clean`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Clean,
    BlockedEmail,
    BlockedDomain,
    Invalid,
}

impl Classification {
    /// File-name stem used by the result writer for this category.
    pub fn file_stem(self) -> &'static str {
        match self {
            Classification::Clean => "clean",
            Classification::BlockedEmail => "blocked_email",
            Classification::BlockedDomain => "blocked_domain",
            Classification::Invalid => "invalid",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_stem())
    }
}
