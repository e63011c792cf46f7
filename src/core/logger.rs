//! Synchronous logger and the `Log` interface shared with the async logger

use super::{
    config::LoggerConfig,
    destination::Destination,
    error::{LoggerError, Result},
    error_handler::{DefaultErrorHandler, ErrorHandler},
    log_level::LogLevel,
    log_record::{LogRecord, Payload, SourceLocation},
    metrics::LoggerMetrics,
};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Operations common to [`Logger`] and [`AsyncLogger`](super::AsyncLogger).
///
/// Only the methods without a `Self: Sized` bound are available through
/// `dyn Log`; the level helpers are conveniences over [`Log::log_at`].
pub trait Log: Send + Sync {
    fn name(&self) -> &str;

    /// Minimum severity that is let through.
    fn level(&self) -> LogLevel;

    #[inline]
    fn should_log(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Filter, build a record and hand it to the delivery path.
    ///
    /// `Err` means the error handler itself failed, or the delivery path is
    /// gone (an async logger whose pool was shut down).
    fn log_at(&self, level: LogLevel, payload: Payload, location: Option<SourceLocation>)
        -> Result<()>;

    fn flush(&self) -> Result<()>;

    #[inline]
    fn log(&self, level: LogLevel, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        if !self.should_log(level) {
            return Ok(());
        }
        self.log_at(level, payload.into(), None)
    }

    #[inline]
    fn trace(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Trace, payload)
    }

    #[inline]
    fn debug(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Debug, payload)
    }

    #[inline]
    fn info(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Info, payload)
    }

    #[inline]
    fn warn(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Warn, payload)
    }

    #[inline]
    fn error(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Error, payload)
    }

    #[inline]
    fn critical(&self, payload: impl Into<Payload>) -> Result<()>
    where
        Self: Sized,
    {
        self.log(LogLevel::Critical, payload)
    }
}

/// Logger that dispatches every record inline on the calling thread.
///
/// Each attached destination receives the record in registration order. A
/// failing destination is reported to the error handler and skipped; the
/// remaining destinations still receive the record.
pub struct Logger {
    name: Arc<str>,
    level: AtomicU8,
    flush_level: AtomicU8,
    destinations: RwLock<Vec<Arc<dyn Destination>>>,
    error_handler: RwLock<ErrorHandler>,
    metrics: LoggerMetrics,
}

impl Logger {
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, destinations: Vec<Arc<dyn Destination>>) -> Self {
        let name = name.into();
        let error_handler = DefaultErrorHandler::new(Arc::clone(&name)).into_handler();
        Self {
            name,
            level: AtomicU8::new(LogLevel::Info as u8),
            flush_level: AtomicU8::new(LogLevel::Off as u8),
            destinations: RwLock::new(destinations),
            error_handler: RwLock::new(error_handler),
            metrics: LoggerMetrics::new(),
        }
    }

    /// Logger with a single destination.
    #[must_use]
    pub fn with_destination<D: Destination + 'static>(
        name: impl Into<Arc<str>>,
        destination: Arc<D>,
    ) -> Self {
        Self::new(name, vec![destination as Arc<dyn Destination>])
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_async_logger::prelude::*;
    ///
    /// let logger = Logger::builder("app")
    ///     .level(LogLevel::Debug)
    ///     .flush_level(LogLevel::Error)
    ///     .build();
    /// assert!(logger.should_log(LogLevel::Debug));
    /// ```
    #[must_use]
    pub fn builder(name: impl Into<Arc<str>>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn flush_level(&self) -> LogLevel {
        LogLevel::from_u8(self.flush_level.load(Ordering::Relaxed))
    }

    /// Records at or above `level` trigger a flush of every destination.
    pub fn set_flush_level(&self, level: LogLevel) {
        self.flush_level.store(level as u8, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_flush(&self, record: &LogRecord) -> bool {
        record.level() != LogLevel::Off && record.level() >= self.flush_level()
    }

    /// Replace the error handler.
    ///
    /// The handler gets one diagnostic per failed emit or flush. An `Err` it
    /// returns aborts the current dispatch and is passed back to the caller.
    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        *self.error_handler.write() = Arc::new(handler);
    }

    pub fn set_shared_error_handler(&self, handler: ErrorHandler) {
        *self.error_handler.write() = handler;
    }

    pub fn add_destination(&self, destination: Arc<dyn Destination>) {
        self.destinations.write().push(destination);
    }

    /// Snapshot of the attached destinations.
    pub fn destinations(&self) -> Vec<Arc<dyn Destination>> {
        self.destinations.read().clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub(crate) fn make_record(
        &self,
        level: LogLevel,
        payload: Payload,
        location: Option<SourceLocation>,
    ) -> LogRecord {
        let record = LogRecord::new(Arc::clone(&self.name), level, payload);
        match location {
            Some(location) => record.with_location(location),
            None => record,
        }
    }

    /// Emit `record` to every destination, then flush if its level calls for it.
    ///
    /// This is the full delivery step; the async path runs it on a worker.
    pub(crate) fn dispatch(&self, record: &LogRecord) -> Result<()> {
        // snapshot: no lock is held while destinations or the handler run
        for destination in self.destinations() {
            if !destination.should_emit(record.level()) {
                continue;
            }
            match guarded(destination.as_ref(), || destination.emit(record)) {
                Ok(()) => {
                    self.metrics.record_emitted();
                }
                Err(e) => {
                    self.metrics.record_emit_failure();
                    self.report(LoggerError::emit(destination.name(), e))?;
                }
            }
        }

        if self.should_flush(record) {
            self.flush_destinations()?;
        }
        Ok(())
    }

    pub(crate) fn flush_destinations(&self) -> Result<()> {
        for destination in self.destinations() {
            if let Err(e) = guarded(destination.as_ref(), || destination.flush()) {
                self.metrics.record_flush_failure();
                self.report(LoggerError::flush(destination.name(), e))?;
            }
        }
        Ok(())
    }

    fn report(&self, error: LoggerError) -> Result<()> {
        self.metrics.record_error_reported();
        // cloned so the handler may replace itself without deadlocking
        let handler = Arc::clone(&*self.error_handler.read());
        handler(&error.to_string())
    }
}

impl Log for Logger {
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    fn log_at(
        &self,
        level: LogLevel,
        payload: Payload,
        location: Option<SourceLocation>,
    ) -> Result<()> {
        if !self.should_log(level) {
            return Ok(());
        }
        let record = self.make_record(level, payload, location);
        self.dispatch(&record)
    }

    fn flush(&self) -> Result<()> {
        self.flush_destinations()
    }
}

/// Run one destination call, turning a panic into a reported error.
fn guarded(destination: &dyn Destination, op: impl FnOnce() -> Result<()>) -> Result<()> {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(result) => result,
        Err(panic_info) => Err(LoggerError::destination_panicked(
            destination.name(),
            panic_message(panic_info.as_ref()),
        )),
    }
}

pub(crate) fn panic_message(panic_info: &(dyn Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_async_logger::prelude::*;
/// use std::sync::Arc;
///
/// let memory = Arc::new(MemoryDestination::new());
/// let logger = Logger::builder("app")
///     .level(LogLevel::Debug)
///     .destination(Arc::clone(&memory))
///     .error_handler(|msg| {
///         eprintln!("logging failed: {}", msg);
///         Ok(())
///     })
///     .build();
///
/// logger.debug("ready").unwrap();
/// assert_eq!(memory.lines().len(), 1);
/// ```
pub struct LoggerBuilder {
    name: Arc<str>,
    level: LogLevel,
    flush_level: LogLevel,
    destinations: Vec<Arc<dyn Destination>>,
    error_handler: Option<ErrorHandler>,
}

impl LoggerBuilder {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            level: LogLevel::Info,
            flush_level: LogLevel::Off,
            destinations: Vec::new(),
            error_handler: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn flush_level(mut self, level: LogLevel) -> Self {
        self.flush_level = level;
        self
    }

    /// Apply the levels from a loaded configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: &LoggerConfig) -> Self {
        self.level = config.level;
        self.flush_level = config.flush_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn destination<D: Destination + 'static>(mut self, destination: Arc<D>) -> Self {
        self.destinations.push(destination);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn shared_destination(mut self, destination: Arc<dyn Destination>) -> Self {
        self.destinations.push(destination);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Logger {
        let logger = Logger::new(self.name, self.destinations);
        logger.set_level(self.level);
        logger.set_flush_level(self.flush_level);
        if let Some(handler) = self.error_handler {
            logger.set_shared_error_handler(handler);
        }
        logger
    }
}
