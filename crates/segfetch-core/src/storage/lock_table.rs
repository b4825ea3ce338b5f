//! Segment lock table: one mutex per output segment, built once per job.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::segment_file::SegmentFile;
use super::segment_path;
use crate::segmenter::RangePlan;

/// Filesystem failure on a specific segment.
#[derive(Debug, thiserror::Error)]
#[error("segment {segment_start} ({}): {source}", .path.display())]
pub struct SegmentIoError {
    pub segment_start: u64,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Outcome of a locked write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// The write created the segment file.
    pub created: bool,
}

/// Maps every segment start to the lock guarding that segment's file.
///
/// The map itself is never mutated after construction, so lookups need no
/// outer lock. Each slot holds the lazily created file; create, seek and
/// write all happen under the slot's mutex.
#[derive(Debug)]
pub struct SegmentLockTable {
    dir: PathBuf,
    plan: RangePlan,
    slots: BTreeMap<u64, Mutex<Option<SegmentFile>>>,
}

impl SegmentLockTable {
    /// One lock per segment implied by `plan`. No files are created here.
    pub fn new(dir: &Path, plan: RangePlan) -> Self {
        let slots = plan.segment_starts().map(|s| (s, Mutex::new(None))).collect();
        Self {
            dir: dir.to_path_buf(),
            plan,
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn path_for(&self, segment_start: u64) -> PathBuf {
        segment_path(&self.dir, segment_start)
    }

    fn slot(&self, segment_start: u64) -> Result<MutexGuard<'_, Option<SegmentFile>>, SegmentIoError> {
        let slot = self.slots.get(&segment_start).ok_or_else(|| SegmentIoError {
            segment_start,
            path: self.path_for(segment_start),
            source: io::Error::new(io::ErrorKind::InvalidInput, "offset is not a segment start"),
        })?;
        Ok(slot.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Write `data` at `file_offset` inside the segment starting at `segment_start`.
    ///
    /// On first touch the file is created and preallocated to the segment's
    /// clipped length. The whole sequence runs under the segment's lock.
    pub fn write(
        &self,
        segment_start: u64,
        file_offset: u64,
        data: &[u8],
    ) -> Result<WriteOutcome, SegmentIoError> {
        let mut slot = self.slot(segment_start)?;
        let path = self.path_for(segment_start);
        let wrap = |source: io::Error| SegmentIoError {
            segment_start,
            path: path.clone(),
            source,
        };

        let created = slot.is_none();
        if created {
            let len = self.plan.segment_len(segment_start);
            tracing::debug!(path = %path.display(), len, "creating segment file");
            *slot = Some(SegmentFile::create(&path, len).map_err(&wrap)?);
        }
        if let Some(file) = slot.as_mut() {
            file.write_at(file_offset, data).map_err(&wrap)?;
        }
        Ok(WriteOutcome { created })
    }

    /// fsync every segment file created so far.
    pub fn sync_all(&self) -> Result<(), SegmentIoError> {
        for &segment_start in self.slots.keys() {
            let slot = self.slot(segment_start)?;
            if let Some(file) = slot.as_ref() {
                file.sync().map_err(|source| SegmentIoError {
                    segment_start,
                    path: file.path().to_path_buf(),
                    source,
                })?;
            }
        }
        Ok(())
    }

    /// Paths of the segment files created so far, in ascending start order.
    pub fn created_paths(&self) -> Vec<PathBuf> {
        self.slots
            .iter()
            .filter_map(|(_, slot)| {
                let slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
                slot.as_ref().map(|f| f.path().to_path_buf())
            })
            .collect()
    }
}
