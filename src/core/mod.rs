//! Core engine types and traits

pub mod async_logger;
pub mod backpressure_queue;
pub mod config;
pub mod destination;
pub mod error;
pub mod error_handler;
pub mod formatter;
pub mod lock_policy;
pub mod log_level;
pub mod log_record;
pub mod logger;
pub mod metrics;
pub mod overflow_policy;
pub mod timestamp;
pub mod worker_pool;

pub use async_logger::AsyncLogger;
pub use backpressure_queue::{BackpressureQueue, EnqueueOutcome, Evictable};
pub use config::{
    LoggerConfig, PoolConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_THREAD_NAME_PREFIX,
    DEFAULT_WORKER_COUNT,
};
pub use destination::Destination;
pub use error::{LoggerError, Result};
pub use error_handler::{DefaultErrorHandler, ErrorHandler, DEFAULT_ERROR_REPORT_INTERVAL};
pub use formatter::{Formatter, OutputFormat, StandardFormatter};
pub use lock_policy::{LockPolicy, Synchronized, Unsynchronized};
pub use log_level::LogLevel;
pub use log_record::{DeferredFn, LogRecord, Payload, SourceLocation};
pub use logger::{Log, Logger, LoggerBuilder};
pub use metrics::{LoggerMetrics, QueueMetrics};
pub use overflow_policy::OverflowPolicy;
pub use timestamp::TimestampFormat;
pub use worker_pool::{ThreadHook, WorkItem, WorkerPool, WorkerPoolBuilder};
