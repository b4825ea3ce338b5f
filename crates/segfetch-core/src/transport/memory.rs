//! In-process transport serving a byte buffer, with injectable faults.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};

use super::{RangeClient, RangeResponse};
use crate::fetch_head::HeadResult;
use crate::retry::FetchError;
use crate::segmenter::ByteRange;

#[derive(Debug, Clone)]
pub struct MemoryClientOptions {
    /// Advertise `Accept-Ranges: bytes` on HEAD.
    pub accept_ranges: bool,
    /// Report `Content-Length` on HEAD.
    pub report_length: bool,
    /// Status returned by HEAD.
    pub head_status: u32,
    /// Number of leading GETs per range start that fail with a connection reset.
    pub transient_failures: HashMap<u64, u32>,
    /// Range starts that always answer with this status and an empty body.
    pub fixed_status: HashMap<u64, u32>,
    /// Range starts whose body is cut to this many bytes.
    pub truncate: HashMap<u64, usize>,
}

impl Default for MemoryClientOptions {
    fn default() -> Self {
        Self {
            accept_ranges: true,
            report_length: true,
            head_status: 200,
            transient_failures: HashMap::new(),
            fixed_status: HashMap::new(),
            truncate: HashMap::new(),
        }
    }
}

/// Serves `body` for HEAD and ranged GET. Records every GET it answers.
pub struct MemoryClient {
    body: Vec<u8>,
    opts: MemoryClientOptions,
    failures_left: Mutex<HashMap<u64, u32>>,
    requests: Mutex<Vec<ByteRange>>,
    heads: Mutex<u32>,
}

impl MemoryClient {
    pub fn new(body: Vec<u8>) -> Self {
        Self::with_options(body, MemoryClientOptions::default())
    }

    pub fn with_options(body: Vec<u8>, opts: MemoryClientOptions) -> Self {
        let failures_left = Mutex::new(opts.transient_failures.clone());
        Self {
            body,
            opts,
            failures_left,
            requests: Mutex::new(Vec::new()),
            heads: Mutex::new(0),
        }
    }

    /// Every GET range received, in arrival order.
    pub fn requests(&self) -> Vec<ByteRange> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn head_count(&self) -> u32 {
        *self.heads.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RangeClient for MemoryClient {
    fn head(&self, _url: &str) -> Result<HeadResult, FetchError> {
        *self.heads.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(HeadResult {
            status: self.opts.head_status,
            content_length: self.opts.report_length.then_some(self.body.len() as u64),
            accept_ranges: self.opts.accept_ranges,
            etag: None,
            last_modified: None,
        })
    }

    fn get_range(&self, _url: &str, range: ByteRange) -> Result<RangeResponse, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(range);

        {
            let mut left = self.failures_left.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(n) = left.get_mut(&range.start) {
                if *n > 0 {
                    *n -= 1;
                    return Err(FetchError::Io(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "injected reset",
                    )));
                }
            }
        }

        if let Some(status) = self.opts.fixed_status.get(&range.start) {
            return Ok(RangeResponse {
                status: *status,
                body: Vec::new(),
            });
        }

        let total = self.body.len() as u64;
        if range.start >= total {
            return Ok(RangeResponse {
                status: 416,
                body: Vec::new(),
            });
        }
        let end = range.end.min(total) as usize;
        let mut body = self.body[range.start as usize..end].to_vec();
        if let Some(cut) = self.opts.truncate.get(&range.start) {
            body.truncate(*cut);
        }
        Ok(RangeResponse { status: 206, body })
    }
}
