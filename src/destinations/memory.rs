//! In-memory destinations, mainly for tests and embedding

use super::locked::{Backend, LockedDestination};
use crate::core::{LockPolicy, LogRecord, Result, StandardFormatter, Synchronized, Unsynchronized};

/// Keeps every rendered record as a line, trailing newline removed.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    lines: Vec<String>,
    flushes: usize,
}

impl Backend for MemoryBackend {
    fn write(&mut self, _record: &LogRecord, bytes: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.lines
            .push(text.strip_suffix('\n').unwrap_or(&text).to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

pub type MemoryDestination = LockedDestination<MemoryBackend, Synchronized>;
pub type MemoryDestinationSt = LockedDestination<MemoryBackend, Unsynchronized>;

impl<P: LockPolicy> LockedDestination<MemoryBackend, P> {
    /// Captures bare messages; swap the formatter to capture full lines.
    pub fn new() -> Self {
        Self::with_backend("memory", MemoryBackend::default())
            .with_formatter(StandardFormatter::message_only())
    }

    /// Snapshot of the captured lines.
    ///
    /// Empty if an unsynchronized destination is being written concurrently.
    pub fn lines(&self) -> Vec<String> {
        self.with_backend_mut(|backend| backend.lines.clone())
            .unwrap_or_default()
    }

    pub fn flush_count(&self) -> usize {
        self.with_backend_mut(|backend| backend.flushes)
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        self.with_backend_mut(|backend| backend.lines.clear());
    }
}

impl<P: LockPolicy> Default for LockedDestination<MemoryBackend, P> {
    fn default() -> Self {
        Self::new()
    }
}
