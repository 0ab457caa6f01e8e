//! Top-level `clap` surface. Shaped after the teacher's actually-wired
//! `sdtm_cli::main`'s inline `Cli`/`Command` (not the richer, unused
//! `sdtm_cli::cli` module) with verbosity/color flags layered on from
//! `clap-verbosity-flag`/`colorchoice-clap`, matching the teacher's
//! `Cargo.toml` dependency pair.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Debug, Parser)]
#[command(name = "mailqual")]
#[command(about = "Offline email batch qualification: validate, filter, enrich")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    #[command(flatten)]
    pub color: Color,

    /// Emit logs as newline-delimited JSON instead of the compact text format.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory holding the blocklist/metadata/cache stores.
    #[arg(long, global = true, value_name = "DIR", default_value = "./mailqual-state")]
    pub state_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read one or more input files, classify and enrich records, write
    /// category outputs (§4.F `process_batch`).
    Process {
        /// Input files (plain-text address lists or structured records).
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output directory for category files and the run summary.
        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        /// Skip files already recorded as processed in the cache.
        #[arg(long)]
        skip_cached: bool,
    },
    /// Run the Smart Filter Engine over a clean-address list (§4.G).
    Filter {
        /// Newline-delimited clean address list.
        clean_addresses: PathBuf,
        /// Filter config document (TOML).
        #[arg(long, value_name = "PATH")]
        config: PathBuf,
        /// Output directory for tier files and the exclusion report.
        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        /// Tag embedded in output filenames (defaults to a UTC timestamp).
        #[arg(long)]
        run_tag: Option<String>,
    },
    /// Manage the blocklist (§4.B).
    Blocklist {
        #[command(subcommand)]
        command: BlocklistCommand,
    },
    /// Query the metadata store (§4.C).
    Metadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },
    /// Inspect or maintain the processing cache (§4.D).
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum BlocklistCommand {
    /// Block a single address.
    AddEmail {
        email: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Block an entire domain (also blocks its subdomains).
    AddDomain {
        domain: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// Remove a previously blocked address.
    RemoveEmail { email: String },
    /// Remove a previously blocked domain.
    RemoveDomain { domain: String },
    /// Import a CSV delivery/bounce log, promoting problematic domains.
    Import {
        log: PathBuf,
        /// Comma-separated statuses to import (default: hard/soft bounce, spam, unsubscribed).
        #[arg(long, value_delimiter = ',')]
        statuses: Option<Vec<String>>,
    },
    /// Print the current blocklist as `kind,target` rows.
    Export,
    /// Print email/domain counts.
    Stats,
    /// Undo the most recent mutation.
    Undo,
    /// Redo the most recently undone mutation.
    Redo,
}

#[derive(Debug, Subcommand)]
pub enum MetadataCommand {
    /// Look up stored metadata for one address.
    Get { address: String },
    /// Search stored metadata by field predicates.
    Search {
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        industry: Option<String>,
    },
    /// Print row counts and per-field coverage.
    Stats,
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print file/address table row counts.
    Query,
    /// Drop all cached fingerprints and seen-address records.
    Invalidate,
    /// Reclaim space after heavy churn.
    Vacuum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_parses_file_list_and_flags() {
        let cli = Cli::parse_from(["mailqual", "process", "a.txt", "b.txt", "--skip-cached"]);
        match cli.command {
            Command::Process { files, skip_cached, .. } => {
                assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
                assert!(skip_cached);
            }
            other => panic!("expected Process, got {other:?}"),
        }
    }

    #[test]
    fn blocklist_import_splits_comma_separated_statuses() {
        let cli = Cli::parse_from([
            "mailqual",
            "blocklist",
            "import",
            "log.csv",
            "--statuses",
            "hard_bounce,spam",
        ]);
        match cli.command {
            Command::Blocklist { command: BlocklistCommand::Import { statuses, .. } } => {
                assert_eq!(statuses, Some(vec!["hard_bounce".to_string(), "spam".to_string()]));
            }
            other => panic!("expected Blocklist Import, got {other:?}"),
        }
    }

    #[test]
    fn state_dir_defaults_when_not_given() {
        let cli = Cli::parse_from(["mailqual", "cache", "query"]);
        assert_eq!(cli.state_dir, PathBuf::from("./mailqual-state"));
    }
}
