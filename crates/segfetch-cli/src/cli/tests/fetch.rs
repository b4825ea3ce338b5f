//! Tests for the fetch subcommand.

use super::parse;
use crate::cli::commands::FetchOverrides;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use segfetch_core::config::SegfetchConfig;
use std::path::Path;

#[test]
fn cli_parse_fetch_positionals() {
    match parse(&["segfetch", "fetch", "https://example.com/f.iso", "4096", "1048576"]) {
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
            assert_eq!(url, "https://example.com/f.iso");
            assert_eq!(http_chunk, 4096);
            assert_eq!(segment_size, 1_048_576);
            assert!(output_dir.is_none());
            assert!(download_workers.is_none());
            assert!(write_workers.is_none());
            assert!(queue_capacity.is_none());
            assert!(!sha256);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_options() {
    match parse(&[
        "segfetch",
        "fetch",
        "http://host/x",
        "10",
        "20",
        "--output-dir",
        "/tmp/out",
        "--download-workers",
        "8",
        "--write-workers",
        "3",
        "--queue-capacity",
        "5",
        "--sha256",
    ]) {
        CliCommand::Fetch {
            output_dir,
            download_workers,
            write_workers,
            queue_capacity,
            sha256,
            ..
        } => {
            assert_eq!(output_dir.as_deref(), Some(Path::new("/tmp/out")));
            assert_eq!(download_workers, Some(8));
            assert_eq!(write_workers, Some(3));
            assert_eq!(queue_capacity, Some(5));
            assert!(sha256);
        }
        _ => panic!("expected Fetch with options"),
    }
}

#[test]
fn cli_parse_fetch_rejects_non_numeric_sizes() {
    assert!(Cli::try_parse_from(["segfetch", "fetch", "http://h/x", "big", "20"]).is_err());
    assert!(Cli::try_parse_from(["segfetch", "fetch", "http://h/x", "10"]).is_err());
}

#[test]
fn overrides_take_precedence_over_config() {
    let cfg = SegfetchConfig::default();
    let overrides = FetchOverrides {
        download_workers: Some(9),
        write_workers: None,
        queue_capacity: Some(3),
    };
    let settings = crate::cli::commands::fetch_settings(
        &cfg,
        "http://h/x",
        10,
        20,
        Path::new("/tmp/out"),
        overrides,
    );
    assert_eq!(settings.download_workers, 9);
    assert_eq!(settings.write_workers, cfg.write_workers);
    assert_eq!(settings.queue_capacity, 3);
    assert_eq!(settings.http_chunk_size, 10);
    assert_eq!(settings.segment_size, 20);
}
