//! Shared state handed to every worker of one job.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{JobError, JobSettings};
use crate::control::CancelToken;
use crate::queue::WorkQueue;
use crate::retry::RetryPolicy;
use crate::segmenter::RangePlan;
use crate::storage::SegmentLockTable;
use crate::writer::{Chunk, ChunkWrite};

/// Counters updated by workers.
#[derive(Debug, Default)]
pub(crate) struct JobStats {
    pub chunks_downloaded: AtomicU64,
    pub retries: AtomicU64,
    pub chunks_split: AtomicU64,
    pub bytes_written: AtomicU64,
}

impl JobStats {
    pub fn record_write(&self, w: &ChunkWrite) {
        self.bytes_written.fetch_add(w.written, Ordering::Relaxed);
        if w.split {
            self.chunks_split.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Queues, lock table, cancellation and error slot for one run.
pub(crate) struct JobContext {
    pub url: String,
    pub plan: RangePlan,
    pub retry: RetryPolicy,
    pub cancel: CancelToken,
    pub download_queue: WorkQueue<u64>,
    pub write_queue: WorkQueue<Chunk>,
    pub locks: SegmentLockTable,
    pub stats: JobStats,
    first_error: Mutex<Option<JobError>>,
}

impl JobContext {
    pub fn new(settings: &JobSettings, plan: RangePlan, cancel: CancelToken) -> Self {
        Self {
            url: settings.url.clone(),
            plan,
            retry: settings.retry,
            download_queue: WorkQueue::new(settings.queue_capacity, cancel.clone()),
            write_queue: WorkQueue::new(settings.queue_capacity, cancel.clone()),
            locks: SegmentLockTable::new(&settings.output_dir, plan),
            stats: JobStats::default(),
            first_error: Mutex::new(None),
            cancel,
        }
    }

    /// Record a fatal error and stop the job. Only the first error is kept.
    pub fn fail(&self, err: JobError) {
        {
            let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_none() {
                tracing::error!("job failed: {}", err);
                *slot = Some(err);
            } else {
                tracing::debug!("additional error after failure: {}", err);
            }
        }
        self.cancel.cancel();
        self.download_queue.wake_all();
        self.write_queue.wake_all();
    }

    pub fn take_error(&self) -> Option<JobError> {
        self.first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Fails the job if the owning worker thread unwinds.
pub(crate) struct WorkerGuard<'a> {
    ctx: &'a JobContext,
    role: &'static str,
}

impl<'a> WorkerGuard<'a> {
    pub fn new(ctx: &'a JobContext, role: &'static str) -> Self {
        Self { ctx, role }
    }
}

impl Drop for WorkerGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.ctx.fail(JobError::WorkerPanicked { role: self.role });
        }
    }
}
