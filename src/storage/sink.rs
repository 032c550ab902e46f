//! Byte sinks for export output.
//!
//! The export worker is the only writer of a sink and closes it exactly once.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fs2::FileExt;
use parking_lot::Mutex;

/// Destination of an export byte stream.
pub trait ByteSink: Send {
    /// Write the whole buffer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flush and release the destination.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn close(&mut self) -> io::Result<()>;
}

/// File-backed sink holding an exclusive advisory lock for its lifetime.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    /// Lock `path` (creating it if needed) and then truncate it.
    ///
    /// A file locked by another holder is left untouched.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened or another holder has the lock.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        file.try_lock_exclusive()?;
        file.set_len(0)?;

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSink for FileSink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.write_all(buf),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is closed")),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush()?;
        file.sync_data()?;
        FileExt::unlock(&file)
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}

/// In-memory sink.
///
/// Clones share the same buffer, so a caller can keep one clone to inspect
/// what the worker wrote.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Arc<Mutex<Vec<u8>>>,
    writes: Arc<Mutex<Vec<usize>>>,
    closes: Arc<AtomicUsize>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// Size of each `write_all` call, in order.
    #[must_use]
    pub fn write_sizes(&self) -> Vec<usize> {
        self.writes.lock().clone()
    }

    /// How many times the sink was closed.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }
}

impl ByteSink for MemorySink {
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.data.lock().extend_from_slice(buf);
        self.writes.lock().push(buf.len());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
