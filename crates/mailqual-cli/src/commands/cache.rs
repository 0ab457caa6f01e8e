use std::path::Path;

use anyhow::Result;
use mailqual_cache::ProcessingCache;

use crate::cli::CacheCommand;

pub fn run(state_dir: &Path, command: CacheCommand) -> Result<()> {
    let cache = ProcessingCache::init(&state_dir.join("cache"))?;

    match command {
        CacheCommand::Query => {
            let (files, addresses) = cache.query_counts()?;
            println!("files: {files}, addresses: {addresses}");
        }
        CacheCommand::Invalidate => {
            cache.invalidate()?;
            println!("cache invalidated");
        }
        CacheCommand::Vacuum => {
            cache.vacuum()?;
            println!("cache vacuumed");
        }
    }
    Ok(())
}
