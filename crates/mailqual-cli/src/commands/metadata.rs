use std::path::Path;

use anyhow::Result;
use mailqual_model::Address;
use mailqual_store::{MetadataStore, SearchFilter};

use crate::cli::MetadataCommand;
use crate::summary;

pub fn run(state_dir: &Path, command: MetadataCommand) -> Result<()> {
    let store = MetadataStore::init(&state_dir.join("metadata"))?;

    match command {
        MetadataCommand::Get { address } => {
            let address = Address::parse(address)?;
            match store.get(&address)? {
                Some(metadata) => println!("{}", serde_json::to_string_pretty(&metadata)?),
                None => println!("no metadata stored for {address}"),
            }
        }
        MetadataCommand::Search { country, industry } => {
            let filter = SearchFilter {
                country,
                category: industry,
                ..Default::default()
            };
            let rows = store.search_by(&filter)?;
            for (address, metadata) in &rows {
                println!("{address}: {}", serde_json::to_string(metadata)?);
            }
            println!("{} match(es)", rows.len());
        }
        MetadataCommand::Stats => {
            summary::print_metadata_stats(&store.stats()?);
        }
    }
    Ok(())
}
