//! Checksum command: SHA-256 of the content held in a segment directory.

use anyhow::Result;
use segfetch_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the reassembled segments in `dir`.
pub fn run_checksum(dir: &Path) -> Result<()> {
    let (digest, set) = checksum::sha256_segments(dir)?;
    tracing::debug!(
        segments = set.segments.len(),
        bytes = set.total_size,
        "hashed segment directory"
    );
    println!("{}  {}", digest, dir.display());
    Ok(())
}
