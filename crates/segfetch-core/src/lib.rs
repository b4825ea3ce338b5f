//! segfetch core: parallel range download reassembled into segment files.
//!
//! The pipeline is driven by [`job::run_job`]; the HTTP side is anything that
//! implements [`transport::RangeClient`].

pub mod checksum;
pub mod config;
pub mod control;
mod downloader;
pub mod fetch_head;
pub mod job;
pub mod logging;
pub mod queue;
pub mod retry;
pub mod segmenter;
pub mod storage;
pub mod transport;
pub mod writer;

pub use control::CancelToken;
pub use job::{run_job, JobError, JobReport, JobSettings};
pub use transport::{CurlClient, CurlOptions, RangeClient};
