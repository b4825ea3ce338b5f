//! Per-run job settings.

use std::path::{Path, PathBuf};

use super::JobError;
use crate::config::SegfetchConfig;
use crate::retry::RetryPolicy;

/// Everything a single run needs besides the HTTP client.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub url: String,
    /// Bytes requested per ranged GET.
    pub http_chunk_size: u64,
    /// Bytes per output segment file.
    pub segment_size: u64,
    /// Directory receiving `<segment_start>.dat` files.
    pub output_dir: PathBuf,
    pub download_workers: usize,
    pub write_workers: usize,
    /// Capacity of each work queue.
    pub queue_capacity: usize,
    pub retry: RetryPolicy,
    /// fsync every segment before reporting success.
    pub sync_segments: bool,
}

impl JobSettings {
    /// Settings with worker counts and policies from the built-in config defaults.
    pub fn new(url: &str, http_chunk_size: u64, segment_size: u64, output_dir: &Path) -> Self {
        Self::from_config(&SegfetchConfig::default(), url, http_chunk_size, segment_size, output_dir)
    }

    pub fn from_config(
        cfg: &SegfetchConfig,
        url: &str,
        http_chunk_size: u64,
        segment_size: u64,
        output_dir: &Path,
    ) -> Self {
        Self {
            url: url.to_string(),
            http_chunk_size,
            segment_size,
            output_dir: output_dir.to_path_buf(),
            download_workers: cfg.download_workers,
            write_workers: cfg.write_workers,
            queue_capacity: cfg.queue_capacity,
            retry: cfg.retry.as_ref().map(RetryPolicy::from).unwrap_or_default(),
            sync_segments: cfg.sync_segments,
        }
    }

    /// Reject settings that cannot describe a valid run.
    pub fn validate(&self) -> Result<(), JobError> {
        let parsed = url::Url::parse(&self.url)
            .map_err(|e| JobError::InvalidConfig(format!("invalid URL {:?}: {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(JobError::InvalidConfig(format!(
                "unsupported URL scheme {:?}",
                parsed.scheme()
            )));
        }
        if self.http_chunk_size == 0 {
            return invalid("download chunk size must be greater than zero");
        }
        if self.segment_size == 0 {
            return invalid("segment size must be greater than zero");
        }
        if self.download_workers == 0 {
            return invalid("at least one download worker is required");
        }
        if self.write_workers == 0 {
            return invalid("at least one segment writer is required");
        }
        if self.queue_capacity == 0 {
            return invalid("queue capacity must be greater than zero");
        }
        if self.write_workers >= self.download_workers {
            tracing::debug!(
                download_workers = self.download_workers,
                write_workers = self.write_workers,
                "more writers than downloaders; writers will mostly idle"
            );
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Result<(), JobError> {
    Err(JobError::InvalidConfig(msg.to_string()))
}
