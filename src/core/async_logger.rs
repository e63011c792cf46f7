//! Logger facade that hands records to a worker pool instead of writing inline

use super::{
    destination::Destination,
    error::{LoggerError, Result},
    log_level::LogLevel,
    log_record::{Payload, SourceLocation},
    logger::{Log, Logger, LoggerBuilder},
    metrics::LoggerMetrics,
    worker_pool::WorkerPool,
};
use std::sync::{Arc, Weak};

/// Asynchronous counterpart of [`Logger`].
///
/// Filtering happens on the caller's thread; everything after that (rendering,
/// destinations, auto-flush, error handling) runs on a pool worker against the
/// wrapped [`Logger`]. The pool is referenced, not owned: dropping an
/// `AsyncLogger` leaves the pool and its queued work alone.
///
/// # Example
///
/// ```
/// use rust_async_logger::prelude::*;
/// use std::sync::Arc;
///
/// let pool = Arc::new(WorkerPool::new(1024, 1, OverflowPolicy::Block).unwrap());
/// let memory = Arc::new(MemoryDestination::new());
/// let logger = AsyncLogger::new("app", vec![memory.clone() as Arc<dyn Destination>], &pool);
///
/// logger.info("queued").unwrap();
/// logger.flush_and_wait().unwrap();
/// assert_eq!(memory.lines().len(), 1);
///
/// pool.shutdown().unwrap();
/// ```
#[derive(Clone)]
pub struct AsyncLogger {
    logger: Arc<Logger>,
    pool: Weak<WorkerPool>,
}

impl AsyncLogger {
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        destinations: Vec<Arc<dyn Destination>>,
        pool: &Arc<WorkerPool>,
    ) -> Self {
        Self::from_logger(Logger::new(name, destinations), pool)
    }

    /// Wrap an already configured logger; it becomes the delivery target.
    #[must_use]
    pub fn from_logger(logger: Logger, pool: &Arc<WorkerPool>) -> Self {
        Self {
            logger: Arc::new(logger),
            pool: Arc::downgrade(pool),
        }
    }

    /// The logger that workers dispatch to.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    pub fn set_level(&self, level: LogLevel) {
        self.logger.set_level(level);
    }

    pub fn flush_level(&self) -> LogLevel {
        self.logger.flush_level()
    }

    /// Evaluated on the worker after each record is delivered.
    pub fn set_flush_level(&self, level: LogLevel) {
        self.logger.set_flush_level(level);
    }

    /// Replace the error handler; it runs on worker threads.
    ///
    /// An `Err` returned by the handler has no caller to reach, so the worker
    /// reports it on stderr and moves on to the next item.
    pub fn set_error_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        self.logger.set_error_handler(handler);
    }

    pub fn add_destination(&self, destination: Arc<dyn Destination>) {
        self.logger.add_destination(destination);
    }

    pub fn destinations(&self) -> Vec<Arc<dyn Destination>> {
        self.logger.destinations()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        self.logger.metrics()
    }

    /// Queue a flush and wait until a worker has executed it.
    ///
    /// Returns the error handler's failure if the flush reported one.
    pub fn flush_and_wait(&self) -> Result<()> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        self.pool()?
            .post_flush(Arc::clone(&self.logger), Some(done_tx))?;
        done_rx
            .recv()
            .map_err(|_| LoggerError::ChannelReceiveError)?
    }

    fn pool(&self) -> Result<Arc<WorkerPool>> {
        self.pool
            .upgrade()
            .ok_or_else(|| LoggerError::pool_shutdown("worker pool no longer exists"))
    }
}

impl Log for AsyncLogger {
    fn name(&self) -> &str {
        self.logger.name()
    }

    #[inline]
    fn level(&self) -> LogLevel {
        self.logger.level()
    }

    /// Queue the record under the pool's overflow policy.
    ///
    /// A record discarded by the policy still returns `Ok`; the drop is
    /// visible in the pool's queue metrics.
    fn log_at(
        &self,
        level: LogLevel,
        payload: Payload,
        location: Option<SourceLocation>,
    ) -> Result<()> {
        if !self.should_log(level) {
            return Ok(());
        }
        let record = self.logger.make_record(level, payload, location);
        self.pool()?
            .post_log(Arc::clone(&self.logger), record)
            .map(|_| ())
    }

    /// Queue a flush request. It is never dropped, whatever the overflow policy.
    fn flush(&self) -> Result<()> {
        self.pool()?.post_flush(Arc::clone(&self.logger), None)
    }
}

impl LoggerBuilder {
    /// Build the logger as the delivery target of an [`AsyncLogger`].
    pub fn build_async(self, pool: &Arc<WorkerPool>) -> AsyncLogger {
        AsyncLogger::from_logger(self.build(), pool)
    }
}
