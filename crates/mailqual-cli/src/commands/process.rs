use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use mailqual_blocklist::BlocklistService;
use mailqual_cache::ProcessingCache;
use mailqual_pipeline::{CancellationToken, Pipeline, ProcessOptions};
use mailqual_store::MetadataStore;

use crate::summary;

pub async fn run(state_dir: &Path, files: Vec<PathBuf>, output_dir: PathBuf, skip_cached: bool) -> Result<()> {
    let blocklist = Arc::new(BlocklistService::init(&state_dir.join("blocklist"))?);
    let metadata_store = Arc::new(MetadataStore::init(&state_dir.join("metadata"))?);
    let cache = Arc::new(ProcessingCache::init(&state_dir.join("cache"))?);

    let pipeline = Pipeline::new(blocklist, metadata_store, cache, output_dir);
    let mut options = ProcessOptions::default();
    options.skip_if_cached = skip_cached;

    let result = pipeline
        .process_batch(&files, &options, CancellationToken::new(), None)
        .await?;
    summary::print_batch_summary(&result);
    Ok(())
}
