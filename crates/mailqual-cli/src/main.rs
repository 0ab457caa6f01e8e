#![deny(unsafe_code)]

use clap::Parser;
use mailqual_cli::cli::{Cli, Command};
use mailqual_cli::logging::{LogConfig, init_logging};
use mailqual_cli::{commands, summary};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.write_global();
    init_logging(&LogConfig::from_level_filter(cli.verbosity.tracing_level_filter(), cli.log_json));

    match cli.command {
        Command::Process { files, output_dir, skip_cached } => {
            commands::process::run(&cli.state_dir, files, output_dir, skip_cached).await
        }
        Command::Filter { clean_addresses, config, output_dir, run_tag } => {
            commands::filter::run(&cli.state_dir, clean_addresses, config, output_dir, run_tag)
        }
        Command::Blocklist { command } => commands::blocklist::run(&cli.state_dir, command),
        Command::Metadata { command } => commands::metadata::run(&cli.state_dir, command),
        Command::Cache { command } => commands::cache::run(&cli.state_dir, command),
    }
    .inspect_err(|error| {
        summary::print_error(error);
    })
}
