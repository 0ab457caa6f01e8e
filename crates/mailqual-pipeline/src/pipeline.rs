//! [`Pipeline`]: orchestrates `process_batch` over a set of input files,
//! per §4.F/§5.
//!
//! Concurrency shape: files are read concurrently up to `options.reader_count`
//! (a semaphore-gated [`tokio::task::JoinSet`]); within each file, one
//! blocking reader task feeds a bounded channel drained by
//! `options.worker_count` worker tasks. The contract names a single
//! run-wide worker pool draining one run-wide channel; this keeps that
//! pool per-file instead; bounding file concurrency already bounds total
//! workers, and it avoids threading a cross-file channel through every
//! reader, at the cost of a looser worst-case concurrency bound than the
//! letter of §5.
//!
//! Category buffers (the four classification outputs and the clean-address
//! metadata sidecar) accumulate for the whole batch in memory and are
//! written once, sorted, at the very end: the final sort order can't be
//! known until every record has been seen, so an early partial flush would
//! have to be re-sorted anyway. `options.flush_threshold` is accepted for
//! API compatibility but only bounds memory, not write count.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::Utc;
use mailqual_model::{Address, Classification, Metadata, Record};
use tokio::sync::{mpsc, Mutex as AsyncMutex, Semaphore};

use mailqual_blocklist::BlocklistService;
use mailqual_cache::{DedupeScope, ProcessingCache};
use mailqual_output::metadata_sidecar::{write_csv_sidecar, write_json_sidecar};
use mailqual_output::summary::{RunSummary, SummaryCounts, SummaryTimings};
use mailqual_output::writer::{sweep_temporaries, AtomicFileWriter};
use mailqual_store::{MetadataStore, PutSource};

use crate::cancellation::CancellationToken;
use crate::error::{PipelineError, Result};
use crate::fingerprint::fingerprint;
use crate::options::{DeduplicateMode, ProcessOptions};
use crate::progress::{BatchProgress, EwmaRate, FileProgress, ProgressDispatcher, ProgressEvent};
use crate::result::{BatchResult, BatchStatus, FileStatus, ProcessResult};

const RECORD_TIMEOUT: Duration = Duration::from_secs(1);
const FILE_READER_TIMEOUT: Duration = Duration::from_secs(600);

const CATEGORY_ORDER: [Classification; 4] = [
    Classification::Clean,
    Classification::BlockedEmail,
    Classification::BlockedDomain,
    Classification::Invalid,
];

#[derive(Clone)]
pub struct Pipeline {
    blocklist: Arc<BlocklistService>,
    metadata_store: Arc<MetadataStore>,
    cache: Arc<ProcessingCache>,
    output_dir: PathBuf,
}

#[derive(Default)]
struct FileBuffers {
    categories: BTreeMap<Classification, Vec<String>>,
    clean_sidecar: Vec<(Address, Metadata)>,
}

#[derive(Default)]
struct FileAggregate {
    counts: BTreeMap<Classification, u64>,
    duplicates_suppressed: u64,
    errors: Vec<String>,
}

enum Outcome {
    Duplicate,
    Emitted {
        classification: Classification,
        display: String,
        metadata: Metadata,
        sidecar_address: Option<Address>,
    },
}

impl Pipeline {
    pub fn new(
        blocklist: Arc<BlocklistService>,
        metadata_store: Arc<MetadataStore>,
        cache: Arc<ProcessingCache>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            blocklist,
            metadata_store,
            cache,
            output_dir: output_dir.into(),
        }
    }

    pub async fn process_batch(
        &self,
        files: &[PathBuf],
        options: &ProcessOptions,
        cancellation: CancellationToken,
        progress: Option<Arc<ProgressDispatcher>>,
    ) -> Result<BatchResult> {
        let started = Instant::now();
        let started_at = Utc::now();
        sweep_temporaries(&self.output_dir)?;

        let reader_semaphore = Arc::new(Semaphore::new(options.reader_count.max(1)));
        let mut join_set = tokio::task::JoinSet::new();
        let files_total = files.len();

        for path in files {
            let pipeline = self.clone();
            let path = path.clone();
            let options = options.clone();
            let cancellation = cancellation.clone();
            let progress = progress.clone();
            let semaphore = reader_semaphore.clone();
            join_set.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("reader semaphore is never closed");
                pipeline
                    .process_one_file(path, options, cancellation, progress)
                    .await
            });
        }

        let mut triples = Vec::with_capacity(files_total);
        let mut files_done = 0usize;
        let mut batch_rate = EwmaRate::new();
        let mut last_file_elapsed = started.elapsed();
        while let Some(joined) = join_set.join_next().await {
            let triple = match joined {
                Ok(Ok(triple)) => triple,
                Ok(Err(e)) => return Err(e),
                Err(join_err) => return Err(PipelineError::TaskPanicked(join_err.to_string())),
            };
            files_done += 1;
            let elapsed = started.elapsed();
            batch_rate.observe(elapsed.saturating_sub(last_file_elapsed));
            last_file_elapsed = elapsed;
            if let Some(p) = &progress {
                p.report(ProgressEvent::Batch(BatchProgress {
                    files_done,
                    files_total,
                    elapsed,
                    eta: batch_rate.eta((files_total - files_done) as u64),
                }));
            }
            triples.push(triple);
        }
        triples.sort_by(|a, b| a.0.path.cmp(&b.0.path));

        let cancelled = cancellation.is_cancelled();
        let results: Vec<ProcessResult> = triples.iter().map(|(r, _, _)| r.clone()).collect();
        let batch = BatchResult::from_files(results, started.elapsed(), cancelled);

        if cancelled {
            return Ok(batch);
        }

        let mut buffers = FileBuffers::default();
        for (result, file_buffers, fp) in triples {
            if let Some(file_buffers) = file_buffers {
                merge_buffers(&mut buffers, file_buffers);
            }
            if result.status == FileStatus::Processed {
                if let Some(fp) = fp {
                    self.cache
                        .record_processed(&fp, &serde_json::json!(result.counts))?;
                }
            }
        }

        if options.write_outputs {
            self.write_outputs(&buffers, &batch, started_at, started.elapsed())?;
        }

        Ok(batch)
    }

    async fn process_one_file(
        &self,
        path: PathBuf,
        options: ProcessOptions,
        cancellation: CancellationToken,
        progress: Option<Arc<ProgressDispatcher>>,
    ) -> Result<(ProcessResult, Option<FileBuffers>, Option<mailqual_model::FileFingerprint>)> {
        let display_path = path.display().to_string();
        let fp = fingerprint(&path)?;

        if options.skip_if_cached && self.cache.was_processed(&fp)? {
            return Ok((
                ProcessResult {
                    path: display_path,
                    status: FileStatus::SkippedCached,
                    counts: BTreeMap::new(),
                    duplicates_suppressed: 0,
                    errors: Vec::new(),
                },
                None,
                None,
            ));
        }

        if cancellation.is_cancelled() {
            return Ok((
                ProcessResult {
                    path: display_path,
                    status: FileStatus::Cancelled,
                    counts: BTreeMap::new(),
                    duplicates_suppressed: 0,
                    errors: Vec::new(),
                },
                None,
                None,
            ));
        }

        let (tx, rx) = mpsc::channel::<mailqual_ingest::Result<Record>>(options.channel_depth.max(1));
        let read_path = path.clone();
        let source_file_id = display_path.clone();
        let reader_source_id = source_file_id.clone();
        let reader_handle =
            tokio::task::spawn_blocking(move || run_reader(&read_path, &reader_source_id, tx));

        let rx = Arc::new(AsyncMutex::new(rx));
        let buffers = Arc::new(Mutex::new(FileBuffers::default()));
        let aggregate = Arc::new(Mutex::new(FileAggregate::default()));
        let rate = Arc::new(Mutex::new(EwmaRate::new()));
        let total_seen = Arc::new(AtomicU64::new(0));
        let fatal: Arc<Mutex<Option<PipelineError>>> = Arc::new(Mutex::new(None));

        let worker_count = options.worker_count.max(1);
        let mut workers = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let pipeline = self.clone();
            let rx = rx.clone();
            let buffers = buffers.clone();
            let aggregate = aggregate.clone();
            let rate = rate.clone();
            let total_seen = total_seen.clone();
            let fatal = fatal.clone();
            let cancellation = cancellation.clone();
            let progress = progress.clone();
            let options = options.clone();
            let source_file_id = source_file_id.clone();
            let content_hash = fp.content_hash.clone();
            let filename = display_path.clone();
            workers.push(tokio::spawn(async move {
                worker_loop(
                    pipeline,
                    rx,
                    buffers,
                    aggregate,
                    rate,
                    total_seen,
                    fatal,
                    cancellation,
                    progress,
                    options,
                    source_file_id,
                    content_hash,
                    filename,
                )
                .await
            }));
        }

        let join_everyone = async {
            for worker in workers {
                let _ = worker.await;
            }
            let _ = reader_handle.await;
        };
        if tokio::time::timeout(FILE_READER_TIMEOUT, join_everyone)
            .await
            .is_err()
        {
            aggregate
                .lock()
                .expect("aggregate lock poisoned")
                .errors
                .push(format!(
                    "file reader timed out after {}s",
                    FILE_READER_TIMEOUT.as_secs()
                ));
        }

        if let Some(fatal) = fatal.lock().expect("fatal lock poisoned").take() {
            return Err(fatal);
        }

        let aggregate = Arc::try_unwrap(aggregate)
            .unwrap_or_else(|arc| Mutex::new(std::mem::take(&mut *arc.lock().unwrap())))
            .into_inner()
            .expect("aggregate lock poisoned");
        let file_buffers = Arc::try_unwrap(buffers)
            .unwrap_or_else(|arc| Mutex::new(std::mem::take(&mut *arc.lock().unwrap())))
            .into_inner()
            .expect("file buffers lock poisoned");

        let status = if !aggregate.errors.is_empty() && aggregate.counts.values().sum::<u64>() == 0
        {
            FileStatus::Failed
        } else {
            FileStatus::Processed
        };

        let result = ProcessResult {
            path: display_path,
            status,
            counts: aggregate.counts,
            duplicates_suppressed: aggregate.duplicates_suppressed,
            errors: aggregate.errors,
        };

        Ok((result, Some(file_buffers), Some(fp)))
    }

    fn classify_record(
        &self,
        mut record: Record,
        source_file_id: &str,
        content_hash: &str,
        options: &ProcessOptions,
    ) -> Result<Outcome> {
        let validated = mailqual_validate::validate(&record.raw_address);

        let address = match validated {
            Err(_) => None,
            Ok(address) => Some(address),
        };

        let classification = match &address {
            None => Classification::Invalid,
            Some(address) => {
                if options.enrich_from_metadata_store {
                    if let Some(stored) = self.metadata_store.get(address)? {
                        fill_missing(record.metadata.get_or_insert_with(Metadata::default), &stored);
                    }
                }
                if self.blocklist.contains_email(address.as_str()) {
                    Classification::BlockedEmail
                } else if self.blocklist.contains_domain(address.domain()) {
                    Classification::BlockedDomain
                } else {
                    Classification::Clean
                }
            }
        };

        let display = match &address {
            Some(address) => address.as_str().to_string(),
            None => mailqual_validate::normalize(&record.raw_address),
        };

        if let Some(address) = &address {
            if options.deduplicate != DeduplicateMode::None {
                let scope = match options.deduplicate {
                    DeduplicateMode::WithinBatch => DedupeScope::BatchLocal,
                    DeduplicateMode::AgainstCache => DedupeScope::Persistent,
                    DeduplicateMode::None => unreachable!("checked above"),
                };
                if self.cache.is_seen(address.as_str(), scope)? {
                    return Ok(Outcome::Duplicate);
                }
            }
        }

        let metadata = record.metadata.clone().unwrap_or_default();

        if classification == Classification::Clean {
            if let Some(address) = &address {
                let source = PutSource {
                    source_file_id: source_file_id.to_string(),
                    content_hash: content_hash.to_string(),
                    observed_at: Utc::now(),
                };
                self.metadata_store.put(address, &metadata, &source)?;
            }
        }

        if let Some(address) = &address {
            self.cache.record_address(address, classification, content_hash)?;
        }

        Ok(Outcome::Emitted {
            classification,
            display,
            metadata,
            sidecar_address: address,
        })
    }

    fn write_outputs(
        &self,
        buffers: &FileBuffers,
        batch: &BatchResult,
        started_at: chrono::DateTime<Utc>,
        wall_time: Duration,
    ) -> Result<()> {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();

        for classification in CATEGORY_ORDER {
            let mut addresses = buffers
                .categories
                .get(&classification)
                .cloned()
                .unwrap_or_default();
            addresses.sort();
            let filename = format!("{}_{}.txt", classification.file_stem(), timestamp);
            AtomicFileWriter::write_lines(&self.output_dir, &filename, addresses.iter().map(String::as_str))?;
        }

        if !buffers.clean_sidecar.is_empty() {
            write_json_sidecar(
                &self.output_dir,
                &format!("metadata_{timestamp}.jsonl"),
                &buffers.clean_sidecar,
            )?;
            write_csv_sidecar(
                &self.output_dir,
                &format!("metadata_{timestamp}.csv"),
                &buffers.clean_sidecar,
            )?;
        }

        let summary = RunSummary {
            counts: SummaryCounts {
                by_classification: batch.totals.clone(),
                duplicates_suppressed: batch.duplicates_suppressed,
                files_processed: batch
                    .files
                    .iter()
                    .filter(|f| f.status == FileStatus::Processed)
                    .count(),
                files_skipped_cached: batch
                    .files
                    .iter()
                    .filter(|f| f.status == FileStatus::SkippedCached)
                    .count(),
                files_failed: batch
                    .files
                    .iter()
                    .filter(|f| f.status == FileStatus::Failed)
                    .count(),
            },
            timings: SummaryTimings {
                started_at,
                finished_at: Utc::now(),
                wall_time_secs: wall_time.as_secs_f64(),
            },
            config_snapshot: serde_json::json!({ "status": format!("{:?}", batch.status) }),
        };
        summary.write(&self.output_dir, &format!("summary_{timestamp}.json"))?;

        Ok(())
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    pipeline: Pipeline,
    rx: Arc<AsyncMutex<mpsc::Receiver<mailqual_ingest::Result<Record>>>>,
    buffers: Arc<Mutex<FileBuffers>>,
    aggregate: Arc<Mutex<FileAggregate>>,
    rate: Arc<Mutex<EwmaRate>>,
    total_seen: Arc<AtomicU64>,
    fatal: Arc<Mutex<Option<PipelineError>>>,
    cancellation: CancellationToken,
    progress: Option<Arc<ProgressDispatcher>>,
    options: ProcessOptions,
    source_file_id: String,
    content_hash: String,
    filename: String,
) {
    loop {
        if cancellation.is_cancelled() || fatal.lock().expect("fatal lock poisoned").is_some() {
            break;
        }

        let (item, backlog) = {
            let mut guard = rx.lock().await;
            let item = guard.recv().await;
            (item, guard.len() as u64)
        };
        let item = match item {
            Some(item) => item,
            None => break,
        };

        let record = match item {
            Ok(record) => record,
            Err(e) => {
                let mut agg = aggregate.lock().expect("aggregate lock poisoned");
                agg.errors.push(e.to_string());
                if agg.errors.len() > 1000 {
                    agg.errors.remove(0);
                }
                continue;
            }
        };

        let start = Instant::now();
        let blocking_pipeline = pipeline.clone();
        let blocking_source_file_id = source_file_id.clone();
        let blocking_content_hash = content_hash.clone();
        let blocking_options = options.clone();
        let handle = tokio::task::spawn_blocking(move || {
            blocking_pipeline.classify_record(
                record,
                &blocking_source_file_id,
                &blocking_content_hash,
                &blocking_options,
            )
        });

        let outcome = match tokio::time::timeout(RECORD_TIMEOUT, handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(PipelineError::TaskPanicked(join_err.to_string())),
            Err(_elapsed) => Ok(Outcome::Emitted {
                classification: Classification::Invalid,
                display: String::new(),
                metadata: Metadata::default(),
                sidecar_address: None,
            }),
        };

        match outcome {
            Err(e) => {
                *fatal.lock().expect("fatal lock poisoned") = Some(e);
                cancellation.cancel();
                break;
            }
            Ok(Outcome::Duplicate) => {
                aggregate
                    .lock()
                    .expect("aggregate lock poisoned")
                    .duplicates_suppressed += 1;
            }
            Ok(Outcome::Emitted {
                classification,
                display,
                metadata,
                sidecar_address,
            }) => {
                {
                    let mut agg = aggregate.lock().expect("aggregate lock poisoned");
                    *agg.counts.entry(classification).or_insert(0) += 1;
                }
                {
                    let mut buf = buffers.lock().expect("file buffers lock poisoned");
                    buf.categories.entry(classification).or_default().push(display);
                    if classification == Classification::Clean {
                        if let Some(address) = sidecar_address {
                            buf.clean_sidecar.push((address, metadata));
                        }
                    }
                }
            }
        }

        let seen = total_seen.fetch_add(1, Ordering::Relaxed) + 1;
        let mut rate_guard = rate.lock().expect("rate lock poisoned");
        rate_guard.observe(start.elapsed());
        if let Some(progress) = &progress {
            progress.report(ProgressEvent::File(FileProgress {
                filename: filename.clone(),
                total_records_seen: seen,
                rate_per_sec: rate_guard.rate_per_sec(),
                eta: rate_guard.eta(backlog),
            }));
        }
    }
}

fn fill_missing(metadata: &mut Metadata, stored: &Metadata) {
    macro_rules! fill {
        ($field:ident) => {
            if metadata.$field.is_none() {
                metadata.$field = stored.$field.clone();
            }
        };
    }
    fill!(source_url);
    fill!(page_title);
    fill!(company_name);
    fill!(phone);
    fill!(country);
    fill!(city);
    fill!(address_line);
    fill!(meta_description);
    fill!(meta_keywords);
    fill!(category);
    fill!(validation_status);
    fill!(validation_log);
    fill!(validation_date);

    for (key, value) in &stored.extras {
        metadata.extras.entry(key.clone()).or_insert_with(|| value.clone());
    }
}

fn merge_buffers(into: &mut FileBuffers, from: FileBuffers) {
    for (classification, mut addresses) in from.categories {
        into.categories
            .entry(classification)
            .or_default()
            .append(&mut addresses);
    }
    into.clean_sidecar.extend(from.clean_sidecar);
}

/// Runs synchronously inside `spawn_blocking`: picks the reader variant by
/// extension (`.xml` → structured, anything else → plain text) and streams
/// records into the channel until the receiver side goes away.
fn run_reader(
    path: &Path,
    source_file_id: &str,
    tx: mpsc::Sender<mailqual_ingest::Result<Record>>,
) {
    let is_structured = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);

    if is_structured {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = tx.blocking_send(Err(mailqual_ingest::IngestError::ReadError {
                    path: path.to_path_buf(),
                    row: 0,
                    cause: e.to_string(),
                }));
                return;
            }
        };
        let reader = mailqual_ingest::StructuredReader::new(&bytes, source_file_id.to_string());
        for item in reader {
            if tx.blocking_send(item).is_err() {
                return;
            }
        }
    } else {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                let _ = tx.blocking_send(Err(mailqual_ingest::IngestError::ReadError {
                    path: path.to_path_buf(),
                    row: 0,
                    cause: e.to_string(),
                }));
                return;
            }
        };
        let reader = mailqual_ingest::PlainTextReader::new(
            std::io::BufReader::new(file),
            source_file_id.to_string(),
        );
        for item in reader {
            if tx.blocking_send(item).is_err() {
                return;
            }
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("output_dir", &self.output_dir)
            .finish()
    }
}
