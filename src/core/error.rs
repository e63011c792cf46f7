//! Error types for the logging engine

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A payload or formatter could not render a record
    #[error("Format error ({context}): {message}")]
    Format { context: String, message: String },

    /// A destination failed to write a record
    #[error("Destination '{destination}' failed to emit record: {source}")]
    Emit {
        destination: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// A destination failed to make its output durable
    #[error("Destination '{destination}' failed to flush: {source}")]
    Flush {
        destination: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// A destination panicked; the panic was contained at the dispatch boundary
    #[error("Destination '{destination}' panicked: {message}")]
    DestinationPanicked { destination: String, message: String },

    /// An unsynchronized destination was entered by two callers at once
    #[error("Destination '{destination}' is unsynchronized and was accessed concurrently")]
    ConcurrentAccess { destination: String },

    /// Work was submitted to a worker pool that is shut down or gone
    #[error("Worker pool is shut down: {0}")]
    PoolShutdown(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Channel receive error
    #[error("Failed to receive completion from worker pool")]
    ChannelReceiveError,

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a format error
    pub fn format(context: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::Format {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Wrap a destination failure raised while emitting
    pub fn emit(destination: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::Emit {
            destination: destination.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a destination failure raised while flushing
    pub fn flush(destination: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::Flush {
            destination: destination.into(),
            source: Box::new(source),
        }
    }

    /// Create a destination panic error
    pub fn destination_panicked(destination: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::DestinationPanicked {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create a concurrent access error for an unsynchronized destination
    pub fn concurrent_access(destination: impl Into<String>) -> Self {
        LoggerError::ConcurrentAccess {
            destination: destination.into(),
        }
    }

    /// Create a pool shutdown error
    pub fn pool_shutdown(message: impl Into<String>) -> Self {
        LoggerError::PoolShutdown(message.into())
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
