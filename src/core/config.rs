//! Configuration surface for loggers and worker pools
//!
//! Both structs deserialize with `serde`, so they can be embedded in an
//! application's own configuration file; missing fields take their defaults.

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use super::overflow_policy::OverflowPolicy;
use serde::{Deserialize, Serialize};

/// Default number of work items a pool queue can hold
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Default number of worker threads
pub const DEFAULT_WORKER_COUNT: usize = 1;

/// Default prefix for worker thread names
pub const DEFAULT_THREAD_NAME_PREFIX: &str = "log-worker";

/// Settings for a [`WorkerPool`](super::WorkerPool)
///
/// # Example
///
/// ```
/// use rust_async_logger::{OverflowPolicy, PoolConfig};
///
/// let config = PoolConfig::from_json(r#"{ "queue_capacity": 1024, "overflow_policy": "discard_new" }"#)
///     .unwrap();
/// assert_eq!(config.worker_count, 1);
/// assert_eq!(config.overflow_policy, OverflowPolicy::DiscardNew);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub queue_capacity: usize,
    /// One worker keeps records in submission order; more workers trade
    /// cross-record ordering for throughput.
    pub worker_count: usize,
    pub overflow_policy: OverflowPolicy,
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: DEFAULT_WORKER_COUNT,
            overflow_policy: OverflowPolicy::default(),
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config(
                "WorkerPool",
                "queue_capacity must be a positive integer",
            ));
        }
        if self.worker_count == 0 {
            return Err(LoggerError::config(
                "WorkerPool",
                "worker_count must be a positive integer",
            ));
        }
        Ok(())
    }
}

/// Level settings for a [`Logger`](super::Logger) or [`AsyncLogger`](super::AsyncLogger)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Minimum severity that is logged
    pub level: LogLevel,
    /// Severity at or above which every destination is flushed
    pub flush_level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            flush_level: LogLevel::Off,
        }
    }
}

impl LoggerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
