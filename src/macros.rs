//! Logging macros for ergonomic log message formatting.
//!
//! The macros check the logger's level before formatting, so arguments of a
//! disabled statement are never rendered. Each call records its source
//! location and returns the logger's `Result<()>`.
//!
//! # Examples
//!
//! ```
//! use rust_async_logger::prelude::*;
//! use rust_async_logger::{debug, info};
//! use std::sync::Arc;
//!
//! let memory = Arc::new(MemoryDestination::new());
//! let logger = Logger::builder("app").destination(Arc::clone(&memory)).build();
//!
//! // Basic logging
//! info!(logger, "Server started").unwrap();
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port).unwrap();
//!
//! // Below the logger's level: nothing is formatted
//! debug!(logger, "expensive {:?}", vec![1, 2, 3]).unwrap();
//!
//! assert_eq!(memory.lines().len(), 2);
//! ```

/// Log a message at an explicit level.
///
/// # Examples
///
/// ```
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new("app", Vec::new());
/// use rust_async_logger::log;
/// log!(logger, LogLevel::Info, "Simple message").unwrap();
/// log!(logger, LogLevel::Error, "Error code: {}", 500).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::Log as _;
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.should_log(level) {
            logger.log_at(
                level,
                $crate::Payload::from(::std::format!($($arg)+)),
                ::std::option::Option::Some($crate::SourceLocation::new(
                    ::std::file!(),
                    ::std::line!(),
                    ::std::module_path!(),
                )),
            )
        } else {
            ::std::result::Result::Ok(())
        }
    }};
}

/// Log a trace-level message.
///
/// # Examples
///
/// ```
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new("app", Vec::new());
/// # logger.set_level(LogLevel::Trace);
/// use rust_async_logger::trace;
/// trace!(logger, "Entering function: calculate()").unwrap();
/// trace!(logger, "Variable value: {}", 42).unwrap();
/// ```
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use rust_async_logger::prelude::*;
/// # let logger = Logger::new("app", Vec::new());
/// use rust_async_logger::warn;
/// warn!(logger, "Retry attempt {} of {}", 3, 5).unwrap();
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a critical-level message.
#[macro_export]
macro_rules! critical {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Critical, $($arg)+)
    };
}
