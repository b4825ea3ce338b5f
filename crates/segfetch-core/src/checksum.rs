//! SHA-256 of the reassembled content, computed from segment files.
//!
//! Streams each `<start>.dat` in ascending start order through the hasher, so
//! the full object is never held in memory. Runs on demand, off the download
//! path.

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::storage::parse_segment_name;

const BUF_SIZE: usize = 64 * 1024;

/// Segment files found in a directory, ordered by start offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSet {
    /// `(segment_start, path)` pairs in ascending start order.
    pub segments: Vec<(u64, PathBuf)>,
    /// Sum of the segment file lengths.
    pub total_size: u64,
}

/// List `<start>.dat` files in `dir` and check they tile `[0, total)` with no gaps or overlaps.
pub fn collect_segments(dir: &Path) -> Result<SegmentSet> {
    let mut found: Vec<(u64, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        let name = entry.file_name();
        if let Some(start) = name.to_str().and_then(parse_segment_name) {
            found.push((start, entry.path()));
        }
    }
    found.sort_by_key(|(start, _)| *start);
    if found.is_empty() {
        bail!("no segment files in {}", dir.display());
    }

    let mut expected = 0u64;
    for (start, path) in &found {
        if *start != expected {
            bail!(
                "segment {} does not follow previous segment (expected start {})",
                path.display(),
                expected
            );
        }
        let len = fs::metadata(path)
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        expected = start + len;
    }

    Ok(SegmentSet {
        segments: found,
        total_size: expected,
    })
}

fn hash_file(hasher: &mut Sha256, path: &Path) -> Result<()> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            return Ok(());
        }
        hasher.update(&buf[..n]);
    }
}

/// SHA-256 (lowercase hex) of `paths` concatenated in the given order.
pub fn sha256_files<P: AsRef<Path>>(paths: &[P]) -> Result<String> {
    let mut hasher = Sha256::new();
    for path in paths {
        hash_file(&mut hasher, path.as_ref())?;
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-256 (lowercase hex) of the content reassembled from the segments in `dir`.
pub fn sha256_segments(dir: &Path) -> Result<(String, SegmentSet)> {
    let set = collect_segments(dir)?;
    let paths: Vec<&PathBuf> = set.segments.iter().map(|(_, p)| p).collect();
    let digest = sha256_files(&paths)?;
    Ok((digest, set))
}
