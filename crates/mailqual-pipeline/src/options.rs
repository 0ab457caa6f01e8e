//! `process_batch` options, per §4.F's `process(files, options) -> BatchResult`
//! contract.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeduplicateMode {
    None,
    WithinBatch,
    AgainstCache,
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub deduplicate: DeduplicateMode,
    pub enrich_from_metadata_store: bool,
    pub write_outputs: bool,
    pub skip_if_cached: bool,
    /// Worker pool size; defaults to CPU count (§5).
    pub worker_count: usize,
    /// Reader pool size; defaults to 2 (§5).
    pub reader_count: usize,
    /// Bounded record-channel depth; defaults to 10,000 (§5).
    pub channel_depth: usize,
    /// Flush per-category buffers to the writer after this many records.
    pub flush_threshold: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            deduplicate: DeduplicateMode::WithinBatch,
            enrich_from_metadata_store: true,
            write_outputs: true,
            skip_if_cached: true,
            worker_count: num_cpus::get().max(1),
            reader_count: 2,
            channel_depth: 10_000,
            flush_threshold: 1_000,
        }
    }
}
