//! Transport error type for retry classification.

use std::fmt;

/// Error from a single HEAD or ranged GET.
/// Classified into an `ErrorKind` to decide retries before it becomes a job error.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// Socket-level failure surfaced as an IO error (e.g. by a non-curl client).
    Io(std::io::Error),
    /// Response status is not what a range request expects.
    Http(u32),
    /// Body length differs from the requested range length (e.g. server closed
    /// early, or ignored the range). Retried instead of silently corrupting a segment.
    BodyLength { expected: u64, received: u64 },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Io(e) => write!(f, "io: {}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::BodyLength { expected, received } => {
                write!(f, "unexpected body length: expected {} bytes, got {}", expected, received)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Io(e) => Some(e),
            FetchError::Http(_) | FetchError::BodyLength { .. } => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e)
    }
}
