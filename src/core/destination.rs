//! Destination trait for log output

use super::{error::Result, log_level::LogLevel, log_record::LogRecord};

/// Consumes records and writes them to some medium.
///
/// Implementations carry their own synchronization (see
/// [`LockPolicy`](super::LockPolicy)); the engine never wraps a destination in
/// an extra lock. Failures are returned, never raised as panics.
pub trait Destination: Send + Sync {
    /// Render `record` and write it out.
    fn emit(&self, record: &LogRecord) -> Result<()>;

    /// Push buffered output down to the medium.
    fn flush(&self) -> Result<()>;

    fn name(&self) -> &str;

    /// Per-destination severity filter, consulted before `emit`.
    fn should_emit(&self, _level: LogLevel) -> bool {
        true
    }
}
