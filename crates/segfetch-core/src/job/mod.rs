//! Completion coordinator.
//!
//! `run_job` validates settings, runs the HEAD preflight, plans chunk and
//! segment ranges, then drives the pipeline:
//!
//! ```text
//! offsets -> download queue -> N download workers -> write queue -> M segment writers -> <start>.dat
//!                                                        ^                  |
//!                                                        +-- overflow ------+
//! ```
//!
//! All workers are scoped OS threads sharing one `JobContext`. The download
//! queue is closed once every offset is enqueued; download workers drain it
//! and exit. The write queue is closed only after its unfinished count reaches
//! zero, since writers feed overflow chunks back into it.

mod context;
mod error;
mod settings;

pub(crate) use context::{JobContext, JobStats, WorkerGuard};
pub use error::JobError;
pub use settings::JobSettings;

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::checksum;
use crate::control::CancelToken;
use crate::downloader;
use crate::fetch_head::ContentMetadata;
use crate::segmenter::RangePlan;
use crate::transport::RangeClient;
use crate::writer;

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub metadata: ContentMetadata,
    /// Ranged GETs that succeeded (one per planned chunk).
    pub chunk_count: u64,
    pub segment_count: u64,
    /// Chunks that crossed a segment boundary and were split.
    pub chunks_split: u64,
    /// Extra GET attempts caused by transient failures.
    pub retries: u64,
    pub bytes_written: u64,
    /// Segment files in ascending start order.
    pub segments: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl JobReport {
    /// SHA-256 of the content, hashed from the segment files this job wrote.
    /// Other `<start>.dat` files in the output directory are ignored.
    pub fn sha256(&self) -> anyhow::Result<String> {
        checksum::sha256_files(&self.segments)
    }
}

/// HEAD the resource and check it can be fetched by byte ranges.
pub fn preflight<C: RangeClient + ?Sized>(client: &C, url: &str) -> Result<ContentMetadata, JobError> {
    let head = client.head(url).map_err(|source| JobError::HeadFailed {
        url: url.to_string(),
        source,
    })?;
    ContentMetadata::from_head(&head).map_err(|source| JobError::Precondition {
        url: url.to_string(),
        source,
    })
}

/// Download `settings.url` into segment files under `settings.output_dir`.
///
/// Nothing is written to disk unless the preflight succeeds. On failure the
/// segment files written so far stay on disk. Pass a `CancelToken` to be able
/// to stop the job from another thread.
pub fn run_job<C: RangeClient + ?Sized>(
    client: &C,
    settings: &JobSettings,
    cancel: Option<CancelToken>,
) -> Result<JobReport, JobError> {
    settings.validate()?;
    let started = Instant::now();

    let metadata = preflight(client, &settings.url)?;
    let plan = RangePlan::new(metadata.total_size, settings.http_chunk_size, settings.segment_size)
        .map_err(|e| JobError::InvalidConfig(e.to_string()))?;
    fs::create_dir_all(&settings.output_dir).map_err(|source| JobError::OutputDir {
        path: settings.output_dir.clone(),
        source,
    })?;

    tracing::info!(
        url = %settings.url,
        total_size = plan.total_size(),
        chunks = plan.chunk_count(),
        segments = plan.segment_count(),
        download_workers = settings.download_workers,
        write_workers = settings.write_workers,
        "starting ranged download"
    );

    let ctx = JobContext::new(settings, plan, cancel.unwrap_or_default());
    run_pipeline(&ctx, client, settings.download_workers, settings.write_workers);

    if let Some(err) = ctx.take_error() {
        return Err(err);
    }
    if ctx.cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    let bytes_written = JobStats::get(&ctx.stats.bytes_written);
    if bytes_written != plan.total_size() {
        return Err(JobError::Incomplete {
            expected: plan.total_size(),
            written: bytes_written,
        });
    }
    if settings.sync_segments {
        ctx.locks.sync_all()?;
    }

    let report = JobReport {
        metadata,
        chunk_count: JobStats::get(&ctx.stats.chunks_downloaded),
        segment_count: plan.segment_count(),
        chunks_split: JobStats::get(&ctx.stats.chunks_split),
        retries: JobStats::get(&ctx.stats.retries),
        bytes_written,
        segments: ctx.locks.created_paths(),
        elapsed: started.elapsed(),
    };
    tracing::info!(
        bytes = report.bytes_written,
        segments = report.segment_count,
        splits = report.chunks_split,
        retries = report.retries,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "download complete"
    );
    Ok(report)
}

fn run_pipeline<C: RangeClient + ?Sized>(
    ctx: &JobContext,
    client: &C,
    download_workers: usize,
    write_workers: usize,
) {
    thread::scope(|s| {
        let downloaders = spawn_workers(s, ctx, "download", download_workers, move || {
            downloader::run_download_worker(ctx, client)
        });
        let writers = spawn_workers(s, ctx, "write", write_workers, move || {
            writer::run_segment_writer(ctx)
        });

        for offset in ctx.plan.chunk_offsets() {
            if ctx.download_queue.push(offset).is_err() {
                break;
            }
        }
        ctx.download_queue.close();
        join_all(downloaders);

        if ctx.write_queue.wait_idle() {
            tracing::debug!("write queue quiescent");
        } else {
            tracing::debug!(
                unfinished = ctx.write_queue.unfinished(),
                "write queue abandoned after cancellation"
            );
        }
        ctx.write_queue.close();
        join_all(writers);
    });
}

fn spawn_workers<'scope, F>(
    scope: &'scope thread::Scope<'scope, '_>,
    ctx: &JobContext,
    role: &'static str,
    count: usize,
    work: F,
) -> Vec<thread::ScopedJoinHandle<'scope, ()>>
where
    F: FnOnce() + Send + Clone + 'scope,
{
    let mut handles = Vec::with_capacity(count);
    for i in 0..count {
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", role, i))
            .spawn_scoped(scope, work.clone());
        match spawned {
            Ok(h) => handles.push(h),
            Err(source) => {
                ctx.fail(JobError::Spawn { role, source });
                break;
            }
        }
    }
    handles
}

/// Panics are already recorded by each worker's `WorkerGuard`.
fn join_all(handles: Vec<thread::ScopedJoinHandle<'_, ()>>) {
    for h in handles {
        let _ = h.join();
    }
}
