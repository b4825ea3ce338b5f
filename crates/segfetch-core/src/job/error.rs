//! Job-level error taxonomy.

use std::io;
use std::path::PathBuf;

use crate::fetch_head::PreflightError;
use crate::retry::FetchError;
use crate::segmenter::ByteRange;
use crate::storage::SegmentIoError;

/// Why a job failed. The first fatal error wins; later ones are only logged.
///
/// Segment files already written are left on disk whatever the error.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Settings rejected before any request is made.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The HEAD request itself failed.
    #[error("HEAD {url} failed: {source}")]
    HeadFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    /// HEAD answered, but the resource cannot be downloaded by ranges.
    #[error("preflight for {url} failed: {source}")]
    Precondition {
        url: String,
        #[source]
        source: PreflightError,
    },

    #[error("cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A ranged GET kept failing (or failed fatally) for this chunk.
    #[error("range {range} at offset {offset} failed: {source}")]
    RangeResponse {
        offset: u64,
        range: ByteRange,
        #[source]
        source: FetchError,
    },

    /// A segment file could not be created, opened, written or synced.
    #[error(transparent)]
    Filesystem(#[from] SegmentIoError),

    #[error("cannot spawn {role} thread: {source}")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{role} thread panicked")]
    WorkerPanicked { role: &'static str },

    #[error("wrote {written} of {expected} bytes")]
    Incomplete { expected: u64, written: u64 },

    /// Cancelled by the caller with no other error recorded.
    #[error("job cancelled")]
    Cancelled,
}

impl JobError {
    /// True for errors raised before any output file could exist.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            JobError::InvalidConfig(_) | JobError::HeadFailed { .. } | JobError::Precondition { .. }
        )
    }
}
