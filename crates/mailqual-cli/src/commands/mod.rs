pub mod blocklist;
pub mod cache;
pub mod filter;
pub mod metadata;
pub mod process;
