//! Download workers.
//!
//! Each worker pops a chunk offset off the download queue, fetches that
//! chunk with a ranged GET (retrying transient failures), and pushes the
//! bytes onto the write queue. Pushing blocks while the write queue is full,
//! which throttles downloads to the speed of the segment writers.

mod fetch;

use std::sync::atomic::Ordering;

use crate::job::{JobContext, JobError, WorkerGuard};
use crate::transport::RangeClient;
use crate::writer::Chunk;

/// Worker loop. Runs until the download queue is closed and drained, or the job is cancelled.
pub(crate) fn run_download_worker<C: RangeClient + ?Sized>(ctx: &JobContext, client: &C) {
    let _guard = WorkerGuard::new(ctx, "download worker");
    let total_size = ctx.plan.total_size();
    while !ctx.cancel.is_cancelled() {
        let offset = match ctx.download_queue.pop() {
            Some(o) => o,
            None => break,
        };
        let range = ctx.plan.chunk_range(offset);
        let fetched = fetch::fetch_chunk(
            client,
            &ctx.url,
            range,
            total_size,
            &ctx.retry,
            &ctx.cancel,
            &ctx.stats.retries,
        );
        match fetched {
            Ok(payload) => {
                tracing::debug!(offset, size = payload.len(), "chunk downloaded");
                ctx.stats.chunks_downloaded.fetch_add(1, Ordering::Relaxed);
                if ctx.write_queue.push(Chunk::new(offset, payload)).is_err() {
                    break;
                }
            }
            Err(source) => ctx.fail(JobError::RangeResponse {
                offset,
                range,
                source,
            }),
        }
    }
}
