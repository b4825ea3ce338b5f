//! HTTP HEAD preflight.
//!
//! Confirms the resource reports a `Content-Length` and advertises
//! `Accept-Ranges: bytes` before any work is scheduled. `probe` is the libcurl
//! implementation used by `CurlClient::head`.

mod parse;

use std::str;

use crate::retry::FetchError;
use crate::transport::CurlOptions;

/// Result of a HEAD request: key headers needed for a ranged download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadResult {
    /// Final HTTP status (after redirects).
    pub status: u32,
    /// Total size in bytes, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// True if server sent `Accept-Ranges: bytes`.
    pub accept_ranges: bool,
    /// `ETag` value if present.
    pub etag: Option<String>,
    /// `Last-Modified` value if present.
    pub last_modified: Option<String>,
}

/// Immutable facts about the remote resource, established once by preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMetadata {
    pub total_size: u64,
    pub supports_ranges: bool,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
}

/// Why a HEAD response cannot start a ranged download.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreflightError {
    #[error("HEAD returned HTTP {0}")]
    Status(u32),
    #[error("server did not report Content-Length")]
    MissingLength,
    #[error("server reported an empty resource")]
    EmptyContent,
    #[error("server does not advertise byte range support")]
    NoRangeSupport,
}

impl ContentMetadata {
    /// Validate a HEAD result: 2xx, positive length, `Accept-Ranges: bytes`.
    pub fn from_head(head: &HeadResult) -> Result<Self, PreflightError> {
        if !(200..300).contains(&head.status) {
            return Err(PreflightError::Status(head.status));
        }
        let total_size = head.content_length.ok_or(PreflightError::MissingLength)?;
        if total_size == 0 {
            return Err(PreflightError::EmptyContent);
        }
        if !head.accept_ranges {
            return Err(PreflightError::NoRangeSupport);
        }
        Ok(Self {
            total_size,
            supports_ranges: true,
            etag: head.etag.clone(),
            last_modified: head.last_modified.clone(),
        })
    }
}

/// Performs a HEAD request with libcurl and returns parsed metadata.
///
/// Follows redirects. Runs in the current thread.
pub fn probe(url: &str, opts: &CurlOptions) -> Result<HeadResult, FetchError> {
    let mut headers: Vec<String> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.nobody(true)?; // HEAD request
    easy.follow_location(true)?;
    opts.apply(&mut easy)?;

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                headers.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let mut result = parse::parse_headers(&headers);
    result.status = easy.response_code()?;
    Ok(result)
}
