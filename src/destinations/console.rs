//! Console destinations

use super::locked::{Backend, LockedDestination};
use crate::core::{
    LockPolicy, LogLevel, LogRecord, Result, StandardFormatter, Synchronized, Unsynchronized,
};
use std::io::{self, Write};

/// Where a [`ConsoleBackend`] sends its output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTarget {
    #[default]
    Stdout,
    Stderr,
    /// `Error` and `Critical` to stderr, everything else to stdout
    Split,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend {
    target: ConsoleTarget,
}

impl ConsoleBackend {
    pub fn new(target: ConsoleTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> ConsoleTarget {
        self.target
    }

    fn uses_stderr(&self, level: LogLevel) -> bool {
        match self.target {
            ConsoleTarget::Stdout => false,
            ConsoleTarget::Stderr => true,
            ConsoleTarget::Split => level >= LogLevel::Error,
        }
    }
}

impl Backend for ConsoleBackend {
    fn write(&mut self, record: &LogRecord, bytes: &[u8]) -> Result<()> {
        if self.uses_stderr(record.level()) {
            io::stderr().lock().write_all(bytes)?;
        } else {
            io::stdout().lock().write_all(bytes)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        match self.target {
            ConsoleTarget::Stdout => io::stdout().flush()?,
            ConsoleTarget::Stderr => io::stderr().flush()?,
            ConsoleTarget::Split => {
                io::stdout().flush()?;
                io::stderr().flush()?;
            }
        }
        Ok(())
    }
}

pub type ConsoleDestinationMt = LockedDestination<ConsoleBackend, Synchronized>;
pub type ConsoleDestinationSt = LockedDestination<ConsoleBackend, Unsynchronized>;

impl<P: LockPolicy> LockedDestination<ConsoleBackend, P> {
    /// Colored text lines on stdout.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_async_logger::prelude::*;
    /// use std::sync::Arc;
    ///
    /// let logger = Logger::builder("app")
    ///     .destination(Arc::new(ConsoleDestinationMt::stdout()))
    ///     .build();
    /// logger.info("hello").unwrap();
    /// ```
    pub fn stdout() -> Self {
        Self::console(ConsoleTarget::Stdout)
    }

    pub fn stderr() -> Self {
        Self::console(ConsoleTarget::Stderr)
    }

    /// Errors and above on stderr, the rest on stdout.
    pub fn split() -> Self {
        Self::console(ConsoleTarget::Split)
    }

    pub fn console(target: ConsoleTarget) -> Self {
        Self::with_backend("console", ConsoleBackend::new(target))
            .with_formatter(StandardFormatter::new().with_colors(true))
    }
}
