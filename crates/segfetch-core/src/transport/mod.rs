//! HTTP capability the pipeline depends on.
//!
//! The core only needs HEAD and ranged GET. `CurlClient` is the libcurl
//! implementation; `MemoryClient` serves a byte buffer in-process.

mod curl_client;
mod memory;

pub use curl_client::{CurlClient, CurlOptions};
pub use memory::{MemoryClient, MemoryClientOptions};

use crate::fetch_head::HeadResult;
use crate::retry::FetchError;
use crate::segmenter::ByteRange;

/// Raw response to a ranged GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// HEAD and ranged GET. Shared by every download worker, hence `Sync`.
pub trait RangeClient: Send + Sync {
    fn head(&self, url: &str) -> Result<HeadResult, FetchError>;

    /// GET `url` with `Range: bytes=<range.start>-<range.end - 1>`.
    fn get_range(&self, url: &str, range: ByteRange) -> Result<RangeResponse, FetchError>;
}
