//! `segfetch fetch` – run one segmented download job.

use anyhow::Result;
use segfetch_core::config::SegfetchConfig;
use segfetch_core::{run_job, CurlClient, CurlOptions, JobReport, JobSettings};
use std::path::Path;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOverrides {
    pub download_workers: Option<usize>,
    pub write_workers: Option<usize>,
    pub queue_capacity: Option<usize>,
}

impl FetchOverrides {
    fn apply(self, settings: &mut JobSettings) {
        if let Some(n) = self.download_workers {
            settings.download_workers = n;
        }
        if let Some(m) = self.write_workers {
            settings.write_workers = m;
        }
        if let Some(k) = self.queue_capacity {
            settings.queue_capacity = k;
        }
    }
}

pub(crate) fn fetch_settings(
    cfg: &SegfetchConfig,
    url: &str,
    http_chunk: u64,
    segment_size: u64,
    output_dir: &Path,
    overrides: FetchOverrides,
) -> JobSettings {
    let mut settings = JobSettings::from_config(cfg, url, http_chunk, segment_size, output_dir);
    overrides.apply(&mut settings);
    settings
}

pub fn run_fetch(
    cfg: &SegfetchConfig,
    url: &str,
    http_chunk: u64,
    segment_size: u64,
    output_dir: &Path,
    overrides: FetchOverrides,
    sha256: bool,
) -> Result<()> {
    let settings = fetch_settings(cfg, url, http_chunk, segment_size, output_dir, overrides);
    let client = CurlClient::new(CurlOptions::from_config(cfg));

    let report = run_job(&client, &settings, None)?;
    print_report(&report, output_dir);

    if sha256 {
        println!("sha256 {}", report.sha256()?);
    }
    Ok(())
}

fn print_report(report: &JobReport, output_dir: &Path) {
    let mib = report.bytes_written as f64 / 1_048_576.0;
    let secs = report.elapsed.as_secs_f64();
    let rate = if secs > 0.0 { mib / secs } else { 0.0 };
    println!(
        "Downloaded {:.1} MiB in {:.1}s ({:.2} MiB/s) into {} segment(s) under {}",
        mib,
        secs,
        rate,
        report.segment_count,
        output_dir.display()
    );
    if report.retries > 0 || report.chunks_split > 0 {
        println!(
            "  {} chunk(s), {} split across segments, {} retried request(s)",
            report.chunk_count, report.chunks_split, report.retries
        );
    }
}
