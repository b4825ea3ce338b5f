//! CLI for the segfetch segmented range downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use segfetch_core::config;
use std::path::PathBuf;

use commands::{run_checksum, run_fetch, FetchOverrides};

/// Top-level CLI for segfetch.
#[derive(Debug, Parser)]
#[command(name = "segfetch")]
#[command(about = "segfetch: parallel HTTP range download into fixed-size segment files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL by ranges and store it as `<start>.dat` segment files.
    Fetch {
        /// Direct HTTP/HTTPS URL to download.
        url: String,

        /// Bytes requested per ranged GET.
        http_chunk: u64,

        /// Bytes per segment file (the last one may be shorter).
        segment_size: u64,

        /// Directory for segment files (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Parallel download workers (overrides config).
        #[arg(long, value_name = "N")]
        download_workers: Option<usize>,

        /// Parallel segment writers (overrides config).
        #[arg(long, value_name = "M")]
        write_workers: Option<usize>,

        /// Capacity of the download and write queues (overrides config).
        #[arg(long, value_name = "K")]
        queue_capacity: Option<usize>,

        /// Print the SHA-256 of the reassembled content when done.
        #[arg(long)]
        sha256: bool,
    },

    /// Compute SHA-256 of the content reassembled from a segment directory.
    Checksum {
        /// Directory holding `<start>.dat` segment files.
        dir: PathBuf,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        cli.command.run()
    }

    fn run(self) -> Result<()> {
        match self {
            CliCommand::Fetch {
                url,
                http_chunk,
                segment_size,
                output_dir,
                download_workers,
                write_workers,
                queue_capacity,
                sha256,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let output_dir = match output_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                let overrides = FetchOverrides {
                    download_workers,
                    write_workers,
                    queue_capacity,
                };
                run_fetch(&cfg, &url, http_chunk, segment_size, &output_dir, overrides, sha256)?;
            }
            CliCommand::Checksum { dir } => run_checksum(&dir)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
