//! One on-disk segment file, preallocated to its clipped length.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// An open segment file. Writes past `len` are refused, so the file never
/// grows beyond its clipped length whatever order chunks arrive in.
#[derive(Debug)]
pub struct SegmentFile {
    file: File,
    path: PathBuf,
    len: u64,
}

impl SegmentFile {
    /// Create (or truncate) the file at `path` and preallocate `len` zero bytes.
    pub fn create(path: &Path, len: u64) -> io::Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let segment = SegmentFile {
            file,
            path: path.to_path_buf(),
            len,
        };
        segment.preallocate()?;
        Ok(segment)
    }

    /// On Unix tries `posix_fallocate` for real block allocation; falls back to
    /// `set_len` on failure or non-Unix. Both leave the file zero-filled.
    fn preallocate(&self) -> io::Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, self.len as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, path = %self.path.display(), "posix_fallocate failed, falling back to set_len");
        }
        self.file.set_len(self.len)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Write all of `data` at `offset` within the segment.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.len) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "write of {} bytes at {} exceeds segment length {}",
                    data.len(),
                    offset,
                    self.len
                ),
            ));
        }
        self.write_all_at(offset, data)
    }

    #[cfg(unix)]
    fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.file.write_all_at(data, offset)
    }

    #[cfg(not(unix))]
    fn write_all_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)
    }

    /// Sync file data to disk.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }
}
