//! # Rust Async Logger
//!
//! A logging engine that separates producing records from delivering them.
//!
//! ## Features
//!
//! - **Sync and async loggers**: [`Logger`] writes inline, [`AsyncLogger`]
//!   hands records to a shared [`WorkerPool`]
//! - **Backpressure**: bounded queue with block, overrun-oldest and
//!   discard-new overflow policies
//! - **Failure isolation**: destination errors and panics are routed to a
//!   per-logger error handler and never reach the caller as panics
//! - **Lock policies**: destinations choose synchronized or unsynchronized
//!   locking by type
//!
//! ## Example
//!
//! ```
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::info;
//! use std::sync::Arc;
//!
//! let pool = Arc::new(WorkerPool::new(1024, 1, OverflowPolicy::Block).unwrap());
//! let memory = Arc::new(MemoryDestination::new());
//! let logger = Logger::builder("app")
//!     .destination(Arc::clone(&memory))
//!     .build_async(&pool);
//!
//! info!(logger, "listening on port {}", 8080).unwrap();
//! logger.flush_and_wait().unwrap();
//! pool.shutdown().unwrap();
//!
//! assert_eq!(memory.lines(), vec!["listening on port 8080".to_string()]);
//! ```

pub mod core;
pub mod destinations;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        AsyncLogger, Destination, LockPolicy, Log, LogLevel, LogRecord, Logger, LoggerBuilder,
        LoggerConfig, LoggerError, OutputFormat, OverflowPolicy, Payload, PoolConfig, Result,
        StandardFormatter, Synchronized, TimestampFormat, Unsynchronized, WorkerPool,
    };
    pub use crate::destinations::{
        ConsoleDestinationMt, ConsoleDestinationSt, FileDestinationMt, FileDestinationSt,
        MemoryDestination, MemoryDestinationSt,
    };
}

pub use core::{
    AsyncLogger, BackpressureQueue, DefaultErrorHandler, Destination, EnqueueOutcome,
    ErrorHandler, Evictable, Formatter, LockPolicy, Log, LogLevel, LogRecord, Logger,
    LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, OutputFormat, OverflowPolicy,
    Payload, PoolConfig, QueueMetrics, Result, SourceLocation, StandardFormatter, Synchronized,
    TimestampFormat, Unsynchronized, WorkItem, WorkerPool, WorkerPoolBuilder,
};
pub use destinations::{
    ConsoleDestinationMt, ConsoleDestinationSt, FileDestinationMt, FileDestinationSt,
    LockedDestination, MemoryDestination,
};
