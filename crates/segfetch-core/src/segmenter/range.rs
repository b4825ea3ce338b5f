//! Byte ranges and the download/segment plan.

use std::fmt;

/// A byte range [start, end) (half-open).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// Start offset (inclusive).
    pub start: u64,
    /// End offset (exclusive).
    pub end: u64,
}

impl ByteRange {
    /// Length of this range in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Last byte offset covered by the range (inclusive), as used by HTTP.
    pub fn last(&self) -> u64 {
        self.end.saturating_sub(1)
    }

    /// Range string in the form curl expects: `start-(end-1)`, no `bytes=` prefix.
    pub fn curl_range(&self) -> String {
        format!("{}-{}", self.start, self.last())
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.last())
    }
}

/// Which size was zero when building a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("content size must be greater than zero")]
    ZeroTotalSize,
    #[error("download chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("segment size must be greater than zero")]
    ZeroSegmentSize,
}

/// Download offsets and segment layout for one resource.
///
/// Download chunks and output segments are sized independently: a chunk may
/// start in one segment and end in the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangePlan {
    total_size: u64,
    chunk_size: u64,
    segment_size: u64,
}

impl RangePlan {
    /// Builds a plan. All three sizes must be non-zero.
    pub fn new(total_size: u64, chunk_size: u64, segment_size: u64) -> Result<Self, PlanError> {
        if total_size == 0 {
            return Err(PlanError::ZeroTotalSize);
        }
        if chunk_size == 0 {
            return Err(PlanError::ZeroChunkSize);
        }
        if segment_size == 0 {
            return Err(PlanError::ZeroSegmentSize);
        }
        Ok(Self {
            total_size,
            chunk_size,
            segment_size,
        })
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    /// Number of ranged GETs: `ceil(total_size / chunk_size)`.
    pub fn chunk_count(&self) -> u64 {
        self.total_size.div_ceil(self.chunk_size)
    }

    /// Download offsets in ascending order: `0, c, 2c, ...` while below `total_size`.
    pub fn chunk_offsets(&self) -> impl Iterator<Item = u64> {
        let chunk_size = self.chunk_size;
        (0..self.chunk_count()).map(move |i| i * chunk_size)
    }

    /// Range requested for the chunk at `offset`; the last one is clamped to the content end.
    pub fn chunk_range(&self, offset: u64) -> ByteRange {
        ByteRange {
            start: offset,
            end: offset.saturating_add(self.chunk_size).min(self.total_size),
        }
    }

    /// Number of output segments: `ceil(total_size / segment_size)`.
    pub fn segment_count(&self) -> u64 {
        self.total_size.div_ceil(self.segment_size)
    }

    /// Segment start offsets in ascending order.
    pub fn segment_starts(&self) -> impl Iterator<Item = u64> {
        let segment_size = self.segment_size;
        (0..self.segment_count()).map(move |i| i * segment_size)
    }

    /// Clipped on-disk length of the segment starting at `segment_start`.
    pub fn segment_len(&self, segment_start: u64) -> u64 {
        self.segment_size.min(self.total_size.saturating_sub(segment_start))
    }
}
