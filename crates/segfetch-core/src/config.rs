use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per ranged GET (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/segfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegfetchConfig {
    /// Parallel download workers (concurrent ranged GETs).
    pub download_workers: usize,
    /// Parallel segment writers. Usually fewer than download workers.
    pub write_workers: usize,
    /// Capacity of the download and write queues (items, not bytes).
    pub queue_capacity: usize,
    /// Connect timeout for each HTTP request.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Abort a transfer whose throughput stays below this many bytes/s...
    #[serde(default = "default_low_speed_limit_bytes")]
    pub low_speed_limit_bytes: u32,
    /// ...for this many seconds.
    #[serde(default = "default_low_speed_time_secs")]
    pub low_speed_time_secs: u64,
    /// Hard wall-clock limit per request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// fsync every segment file once the job completes.
    #[serde(default = "default_sync_segments")]
    pub sync_segments: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_low_speed_limit_bytes() -> u32 {
    1024
}

fn default_low_speed_time_secs() -> u64 {
    60
}

fn default_timeout_secs() -> u64 {
    3600
}

fn default_sync_segments() -> bool {
    true
}

impl Default for SegfetchConfig {
    fn default() -> Self {
        Self {
            download_workers: 6,
            write_workers: 2,
            queue_capacity: 32,
            connect_timeout_secs: default_connect_timeout_secs(),
            low_speed_limit_bytes: default_low_speed_limit_bytes(),
            low_speed_time_secs: default_low_speed_time_secs(),
            timeout_secs: default_timeout_secs(),
            sync_segments: default_sync_segments(),
            retry: None,
        }
    }
}

impl RetryConfig {
    /// Reject delays that cannot be represented as a `Duration`.
    pub fn validate(&self) -> Result<()> {
        if !self.base_delay_secs.is_finite()
            || self.base_delay_secs < 0.0
            || self.base_delay_secs > self.max_delay_secs as f64
        {
            bail!(
                "retry.base_delay_secs must be between 0 and retry.max_delay_secs ({}), got {}",
                self.max_delay_secs,
                self.base_delay_secs
            );
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("segfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SegfetchConfig> {
    load_or_init_at(&config_path()?)
}

/// Same as `load_or_init` for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<SegfetchConfig> {
    if !path.exists() {
        let default_cfg = SegfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SegfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    if let Some(retry) = &cfg.retry {
        retry
            .validate()
            .with_context(|| format!("invalid {}", path.display()))?;
    }
    Ok(cfg)
}
