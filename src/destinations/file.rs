//! Plain file destinations

use super::locked::{Backend, LockedDestination};
use crate::core::{LockPolicy, LogRecord, LoggerError, Result, Synchronized, Unsynchronized};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered writer over a single file.
///
/// Output reaches the file on `flush` or when the buffer fills; pair the
/// logger with a flush level if records must survive a crash.
pub struct FileBackend {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileBackend {
    /// Open `path` for appending, creating it if needed.
    pub fn append(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path.into(), false)
    }

    /// Open `path` and discard its previous contents.
    pub fn truncate(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path.into(), true)
    }

    fn open(path: PathBuf, truncate: bool) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        let file = options.open(&path).map_err(|e| {
            LoggerError::io_operation("opening log file", path.display().to_string(), e)
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for FileBackend {
    fn write(&mut self, _record: &LogRecord, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for FileBackend {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.writer.flush();
    }
}

pub type FileDestinationMt = LockedDestination<FileBackend, Synchronized>;
pub type FileDestinationSt = LockedDestination<FileBackend, Unsynchronized>;

impl<P: LockPolicy> LockedDestination<FileBackend, P> {
    /// Text lines appended to `path`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_async_logger::destinations::FileDestinationMt;
    /// use rust_async_logger::{OutputFormat, StandardFormatter};
    ///
    /// let destination = FileDestinationMt::new("/var/log/app.log")
    ///     .unwrap()
    ///     .with_formatter(StandardFormatter::new().with_output_format(OutputFormat::Json));
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_backend("file", FileBackend::append(path)?))
    }

    /// Like [`new`](Self::new), but starts from an empty file.
    pub fn truncating(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_backend("file", FileBackend::truncate(path)?))
    }
}
