//! Counters for observing the logging pipeline
//!
//! [`QueueMetrics`] tracks the bounded queue (accepted, overrun and discarded
//! items, producer stalls); [`LoggerMetrics`] tracks dispatch outcomes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`BackpressureQueue`](super::BackpressureQueue).
///
/// # Example
///
/// ```
/// use rust_async_logger::QueueMetrics;
///
/// let metrics = QueueMetrics::new();
/// metrics.record_discarded();
/// assert_eq!(metrics.discarded_count(), 1);
/// ```
#[derive(Debug)]
pub struct QueueMetrics {
    /// Items accepted into the queue
    enqueued: AtomicU64,

    /// Items handed to a consumer
    dequeued: AtomicU64,

    /// Queued items evicted to make room under `OverrunOldest`
    overrun: AtomicU64,

    /// Incoming items rejected under `DiscardNew`
    discarded: AtomicU64,

    /// Times a producer had to wait for a free slot
    blocked: AtomicU64,
}

impl QueueMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dequeued: AtomicU64::new(0),
            overrun: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            blocked: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dequeued_count(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn overrun_count(&self) -> u64 {
        self.overrun.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded_count(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn blocked_count(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dequeued(&self) -> u64 {
        self.dequeued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_overrun(&self) -> u64 {
        self.overrun.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded(&self) -> u64 {
        self.discarded.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_blocked(&self) -> u64 {
        self.blocked.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of offered log items that were lost to overrun or discard,
    /// as a percentage (0.0 - 100.0).
    pub fn loss_rate(&self) -> f64 {
        let lost = (self.overrun_count() + self.discarded_count()) as f64;
        let offered = self.enqueued_count() as f64 + self.discarded_count() as f64;
        if offered == 0.0 {
            0.0
        } else {
            (lost / offered) * 100.0
        }
    }

    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dequeued.store(0, Ordering::Relaxed);
        self.overrun.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
        self.blocked.store(0, Ordering::Relaxed);
    }
}

impl Default for QueueMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters maintained by a [`Logger`](super::Logger) while dispatching.
#[derive(Debug)]
pub struct LoggerMetrics {
    emitted: AtomicU64,
    emit_failures: AtomicU64,
    flush_failures: AtomicU64,
    errors_reported: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            emit_failures: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
            errors_reported: AtomicU64::new(0),
        }
    }

    /// Successful `emit` calls, counted per destination
    #[inline]
    pub fn emitted_count(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn emit_failure_count(&self) -> u64 {
        self.emit_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_failure_count(&self) -> u64 {
        self.flush_failures.load(Ordering::Relaxed)
    }

    /// Times the error handler was invoked
    #[inline]
    pub fn errors_reported(&self) -> u64 {
        self.errors_reported.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emitted(&self) -> u64 {
        self.emitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_emit_failure(&self) -> u64 {
        self.emit_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush_failure(&self) -> u64 {
        self.flush_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_error_reported(&self) -> u64 {
        self.errors_reported.fetch_add(1, Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.emitted.store(0, Ordering::Relaxed);
        self.emit_failures.store(0, Ordering::Relaxed);
        self.flush_failures.store(0, Ordering::Relaxed);
        self.errors_reported.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_metrics_new() {
        let metrics = QueueMetrics::new();
        assert_eq!(metrics.enqueued_count(), 0);
        assert_eq!(metrics.overrun_count(), 0);
        assert_eq!(metrics.discarded_count(), 0);
        assert_eq!(metrics.loss_rate(), 0.0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = QueueMetrics::new();
        assert_eq!(metrics.record_overrun(), 0);
        assert_eq!(metrics.record_overrun(), 1);
        assert_eq!(metrics.overrun_count(), 2);
    }

    #[test]
    fn test_loss_rate() {
        let metrics = QueueMetrics::new();
        for _ in 0..90 {
            metrics.record_enqueued();
        }
        for _ in 0..10 {
            metrics.record_discarded();
        }
        let rate = metrics.loss_rate();
        assert!((9.9..=10.1).contains(&rate), "Loss rate was {}", rate);
    }

    #[test]
    fn test_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_emitted();
        metrics.record_emit_failure();
        metrics.record_error_reported();

        metrics.reset();

        assert_eq!(metrics.emitted_count(), 0);
        assert_eq!(metrics.emit_failure_count(), 0);
        assert_eq!(metrics.errors_reported(), 0);
    }
}
