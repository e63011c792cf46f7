//! Error handlers invoked when a destination fails
//!
//! The handler receives a human-readable diagnostic. Returning `Err` from a
//! handler propagates that error to whoever triggered the dispatch.

use super::error::Result;
use chrono::Utc;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback invoked with a diagnostic for every failed emit or flush.
pub type ErrorHandler = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// Minimum spacing between two reports of the default handler.
pub const DEFAULT_ERROR_REPORT_INTERVAL: Duration = Duration::from_secs(1);

struct ReportState {
    error_count: u64,
    last_report: Option<Instant>,
    writer: Box<dyn Write + Send>,
}

/// Handler installed on every new logger.
///
/// Counts every failure but writes at most one line per interval to its
/// fallback stream (stderr unless configured otherwise), so a failing
/// destination cannot turn into a flood of diagnostics.
pub struct DefaultErrorHandler {
    logger_name: Arc<str>,
    interval: Duration,
    state: Mutex<ReportState>,
}

impl DefaultErrorHandler {
    pub fn new(logger_name: Arc<str>) -> Self {
        Self::with_writer(logger_name, std::io::stderr())
    }

    pub fn with_writer(logger_name: Arc<str>, writer: impl Write + Send + 'static) -> Self {
        Self {
            logger_name,
            interval: DEFAULT_ERROR_REPORT_INTERVAL,
            state: Mutex::new(ReportState {
                error_count: 0,
                last_report: None,
                writer: Box::new(writer),
            }),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Failures seen so far, including ones that were not reported.
    pub fn error_count(&self) -> u64 {
        self.state.lock().error_count
    }

    pub fn handle(&self, message: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.error_count += 1;

        let now = Instant::now();
        if let Some(last) = state.last_report {
            if now.duration_since(last) < self.interval {
                return Ok(());
            }
        }
        state.last_report = Some(now);

        let count = state.error_count;
        // Nothing is left to report a failing fallback stream to.
        let _ = writeln!(
            state.writer,
            "[*** LOG ERROR #{:04} ***] [{}] [{}] {}",
            count,
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            self.logger_name,
            message
        );
        let _ = state.writer.flush();
        Ok(())
    }

    pub fn into_handler(self) -> ErrorHandler {
        let handler = Arc::new(self);
        Arc::new(move |message: &str| handler.handle(message))
    }
}
