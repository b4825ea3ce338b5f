//! Segment writers.
//!
//! Each writer pops chunks off the write queue, cuts any part that crosses
//! into the next segment and feeds it back onto the same queue, then writes
//! the remainder into its segment file under that segment's lock.

mod split;

pub use split::{split_at_segment_boundary, Chunk, Placement};

use crate::job::{JobContext, WorkerGuard};
use crate::queue::WorkQueue;
use crate::storage::{SegmentIoError, SegmentLockTable};

/// What one `write_chunk` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkWrite {
    pub placement: Placement,
    /// Bytes written into this segment.
    pub written: u64,
    /// An overflow chunk was queued for the next segment.
    pub split: bool,
    /// This write created the segment file.
    pub created: bool,
}

/// Route one chunk: queue the overflow (if any) and write the rest.
///
/// The overflow is queued before the caller marks `chunk` done, so the
/// queue's unfinished count never drops to zero while work is outstanding.
/// If the queue refuses the overflow (cancelled), only the head is written.
pub fn write_chunk(
    locks: &SegmentLockTable,
    queue: &WorkQueue<Chunk>,
    segment_size: u64,
    chunk: Chunk,
) -> Result<ChunkWrite, SegmentIoError> {
    let (head, overflow) = split_at_segment_boundary(chunk, segment_size);
    let placement = Placement::of(head.offset, segment_size);

    let split = match overflow {
        Some(rest) => {
            tracing::debug!(
                segment_start = placement.segment_start,
                overflow = rest.size(),
                next_offset = rest.offset,
                "splitting chunk at segment boundary"
            );
            queue.push_overflow(rest).is_ok()
        }
        None => false,
    };

    tracing::trace!(
        offset = head.offset,
        size = head.size(),
        segment_start = placement.segment_start,
        file_offset = placement.file_offset,
        "writing chunk"
    );
    let outcome = locks.write(placement.segment_start, placement.file_offset, &head.payload)?;

    Ok(ChunkWrite {
        placement,
        written: head.size(),
        split,
        created: outcome.created,
    })
}

/// Writer loop. Runs until the write queue is closed and drained, or the job is cancelled.
pub(crate) fn run_segment_writer(ctx: &JobContext) {
    let _guard = WorkerGuard::new(ctx, "segment writer");
    let segment_size = ctx.plan.segment_size();
    while !ctx.cancel.is_cancelled() {
        let chunk = match ctx.write_queue.pop() {
            Some(c) => c,
            None => break,
        };
        match write_chunk(&ctx.locks, &ctx.write_queue, segment_size, chunk) {
            Ok(w) => ctx.stats.record_write(&w),
            Err(e) => ctx.fail(e.into()),
        }
        ctx.write_queue.task_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::CancelToken;
    use crate::segmenter::RangePlan;

    #[test]
    fn spanning_chunk_writes_head_and_queues_tail() {
        let dir = tempfile::tempdir().unwrap();
        let plan = RangePlan::new(10, 4, 6).unwrap();
        let locks = SegmentLockTable::new(dir.path(), plan);
        let queue = WorkQueue::new(4, CancelToken::new());

        let w = write_chunk(&locks, &queue, 6, Chunk::new(4, b"4567".to_vec())).unwrap();
        assert!(w.split);
        assert!(w.created);
        assert_eq!(w.written, 2);
        assert_eq!(w.placement, Placement { segment_start: 0, file_offset: 4 });
        assert_eq!(std::fs::read(dir.path().join("0.dat")).unwrap(), vec![0, 0, 0, 0, b'4', b'5']);

        let tail = queue.pop().unwrap();
        assert_eq!(tail, Chunk::new(6, b"67".to_vec()));
        let w = write_chunk(&locks, &queue, 6, tail).unwrap();
        assert!(!w.split);
        assert_eq!(w.placement, Placement { segment_start: 6, file_offset: 0 });
        assert_eq!(std::fs::read(dir.path().join("6.dat")).unwrap(), vec![b'6', b'7', 0, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn writing_same_chunk_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let content: Vec<u8> = (0u8..10).collect();
        let plan = RangePlan::new(10, 4, 6).unwrap();
        let locks = SegmentLockTable::new(dir.path(), plan);
        let queue = WorkQueue::new(4, CancelToken::new());

        for off in [0u64, 8] {
            let end = (off as usize + 4).min(10);
            write_chunk(&locks, &queue, 6, Chunk::new(off, content[off as usize..end].to_vec())).unwrap();
        }
        write_chunk(&locks, &queue, 6, Chunk::new(4, content[4..8].to_vec())).unwrap();
        let tail = queue.pop().unwrap();
        write_chunk(&locks, &queue, 6, tail).unwrap();
        let once = (
            std::fs::read(dir.path().join("0.dat")).unwrap(),
            std::fs::read(dir.path().join("6.dat")).unwrap(),
        );

        write_chunk(&locks, &queue, 6, Chunk::new(4, content[4..8].to_vec())).unwrap();
        let tail = queue.pop().unwrap();
        write_chunk(&locks, &queue, 6, tail).unwrap();
        let twice = (
            std::fs::read(dir.path().join("0.dat")).unwrap(),
            std::fs::read(dir.path().join("6.dat")).unwrap(),
        );

        assert_eq!(once, twice);
        assert_eq!(once.0, content[..6].to_vec());
        assert_eq!(once.1, content[6..].to_vec());
    }

    #[test]
    fn cancelled_queue_drops_overflow_but_writes_head() {
        let dir = tempfile::tempdir().unwrap();
        let plan = RangePlan::new(10, 4, 6).unwrap();
        let locks = SegmentLockTable::new(dir.path(), plan);
        let cancel = CancelToken::new();
        let queue = WorkQueue::new(4, cancel.clone());
        cancel.cancel();

        let w = write_chunk(&locks, &queue, 6, Chunk::new(4, b"4567".to_vec())).unwrap();
        assert!(!w.split);
        assert_eq!(w.written, 2);
        assert_eq!(queue.unfinished(), 0);
    }
}
