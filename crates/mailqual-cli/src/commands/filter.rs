use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use mailqual_filter::{FilterEngine, load_from_path};
use mailqual_store::MetadataStore;

use crate::summary;

pub fn run(
    state_dir: &Path,
    clean_addresses: PathBuf,
    config: PathBuf,
    output_dir: PathBuf,
    run_tag: Option<String>,
) -> Result<()> {
    let filter_config = load_from_path(&config)?;
    let metadata_store = MetadataStore::init(&state_dir.join("metadata"))?;
    let engine = FilterEngine::new(filter_config);

    let run_tag = run_tag.unwrap_or_else(|| Utc::now().format("%Y%m%d_%H%M%S").to_string());
    let result = engine.run(&clean_addresses, &metadata_store, &output_dir, &run_tag)?;
    summary::print_filter_summary(&result.counts, &result.paths);
    Ok(())
}
