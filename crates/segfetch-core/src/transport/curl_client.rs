//! libcurl transport: one Easy handle per request.

use std::time::Duration;

use super::{RangeClient, RangeResponse};
use crate::config::SegfetchConfig;
use crate::fetch_head::{self, HeadResult};
use crate::retry::FetchError;
use crate::segmenter::ByteRange;

/// Per-handle curl timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Abort if throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
    /// Hard timeout so a completely stuck transfer eventually fails.
    pub timeout: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
            timeout: Duration::from_secs(3600),
        }
    }
}

impl CurlOptions {
    pub fn from_config(cfg: &SegfetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            low_speed_limit: cfg.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(cfg.low_speed_time_secs),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    pub(crate) fn apply(&self, easy: &mut curl::easy::Easy) -> Result<(), curl::Error> {
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    opts: CurlOptions,
}

impl CurlClient {
    pub fn new(opts: CurlOptions) -> Self {
        Self { opts }
    }
}

impl RangeClient for CurlClient {
    fn head(&self, url: &str) -> Result<HeadResult, FetchError> {
        fetch_head::probe(url, &self.opts)
    }

    fn get_range(&self, url: &str, range: ByteRange) -> Result<RangeResponse, FetchError> {
        let mut body: Vec<u8> = Vec::with_capacity(range.len() as usize);

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        self.opts.apply(&mut easy)?;
        easy.range(&range.curl_range())?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        Ok(RangeResponse { status, body })
    }
}
