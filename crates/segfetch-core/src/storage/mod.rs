//! Segment files on disk.
//!
//! Each segment is a file named `<segment_start>.dat`, created on first write
//! and preallocated (fallocate on Linux when available, else set_len) to its
//! clipped length. Writes are guarded per segment by `SegmentLockTable`.

mod lock_table;
mod segment_file;

pub use lock_table::{SegmentIoError, SegmentLockTable, WriteOutcome};
pub use segment_file::SegmentFile;

use std::path::{Path, PathBuf};

/// File extension of segment files.
pub const SEGMENT_EXTENSION: &str = "dat";

/// Path of the segment starting at `segment_start` inside `dir`.
pub fn segment_path(dir: &Path, segment_start: u64) -> PathBuf {
    dir.join(format!("{}.{}", segment_start, SEGMENT_EXTENSION))
}

/// Parse a segment start back out of a file name like `6.dat`.
pub fn parse_segment_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(SEGMENT_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}
