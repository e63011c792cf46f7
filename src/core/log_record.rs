//! Log record structure

use super::error::{LoggerError, Result};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<Arc<str>>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<Arc<str>>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> Arc<str> {
    THREAD_ID_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        let id = cache.get_or_insert_with(|| Arc::from(format!("{:?}", std::thread::current().id())));
        Arc::clone(id)
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<Arc<str>> {
    THREAD_NAME_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        cache
            .get_or_insert_with(|| std::thread::current().name().map(Arc::from))
            .clone()
    })
}

/// Closure that writes a message on demand.
pub type DeferredFn = dyn Fn(&mut fmt::Formatter<'_>) -> fmt::Result + Send + Sync;

/// Raw message of a record: either already rendered text or a closure that
/// renders it when a destination asks for it.
#[derive(Clone)]
pub enum Payload {
    Text(Cow<'static, str>),
    Deferred(Arc<DeferredFn>),
}

impl Payload {
    pub const fn from_static(text: &'static str) -> Self {
        Payload::Text(Cow::Borrowed(text))
    }

    /// Wrap a formatting closure; it runs only if the record reaches a destination.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_async_logger::Payload;
    ///
    /// let port = 8080;
    /// let payload = Payload::deferred(move |f| write!(f, "listening on {}", port));
    /// assert_eq!(payload.render().unwrap(), "listening on 8080");
    /// ```
    pub fn deferred<F>(render: F) -> Self
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result + Send + Sync + 'static,
    {
        Payload::Deferred(Arc::new(render))
    }

    /// Produce the message text, running the deferred closure if there is one.
    pub fn render(&self) -> Result<Cow<'_, str>> {
        match self {
            Payload::Text(text) => Ok(Cow::Borrowed(text.as_ref())),
            Payload::Deferred(render) => {
                let mut out = String::new();
                fmt::write(&mut out, format_args!("{}", DeferredDisplay(render.as_ref())))
                    .map_err(|_| {
                        LoggerError::format("deferred payload", "formatting closure returned an error")
                    })?;
                Ok(Cow::Owned(out))
            }
        }
    }
}

struct DeferredDisplay<'a>(&'a DeferredFn);

impl fmt::Display for DeferredDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Payload::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(Cow::Owned(text))
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(Cow::Owned(text.to_owned()))
    }
}

impl From<Cow<'static, str>> for Payload {
    fn from(text: Cow<'static, str>) -> Self {
        Payload::Text(text)
    }
}

/// Call site of a logging statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub module_path: &'static str,
}

impl SourceLocation {
    pub const fn new(file: &'static str, line: u32, module_path: &'static str) -> Self {
        Self {
            file,
            line,
            module_path,
        }
    }
}

/// Snapshot of one logging event.
///
/// Fields are fixed once the record is built; it is moved into the delivery
/// path and read, never modified, by destinations.
#[derive(Debug, Clone)]
pub struct LogRecord {
    logger_name: Arc<str>,
    level: LogLevel,
    timestamp: DateTime<Utc>,
    payload: Payload,
    location: Option<SourceLocation>,
    thread_id: Arc<str>,
    thread_name: Option<Arc<str>>,
}

impl LogRecord {
    pub fn new(logger_name: Arc<str>, level: LogLevel, payload: Payload) -> Self {
        Self {
            logger_name,
            level,
            timestamp: Utc::now(),
            payload,
            location: None,
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn timestamp(&self) -> &DateTime<Utc> {
        &self.timestamp
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn thread_name(&self) -> Option<&str> {
        self.thread_name.as_deref()
    }

    /// Thread name if the thread has one, otherwise its id.
    pub fn thread_label(&self) -> &str {
        self.thread_name().unwrap_or(&self.thread_id)
    }

    /// Render the payload into message text.
    pub fn message(&self) -> Result<Cow<'_, str>> {
        self.payload.render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_text_payload_renders_borrowed() {
        let payload = Payload::from_static("hello");
        assert!(matches!(payload.render().unwrap(), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_deferred_payload_runs_on_render_only() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let payload = Payload::deferred(move |f| {
            counter.fetch_add(1, Ordering::SeqCst);
            write!(f, "value={}", 7)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(payload.render().unwrap(), "value=7");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_deferred_payload_is_format_error() {
        let payload = Payload::deferred(|_| Err(fmt::Error));
        let err = payload.render().unwrap_err();
        assert!(matches!(err, LoggerError::Format { .. }));
    }

    #[test]
    fn test_record_captures_thread_and_location() {
        let record = LogRecord::new(Arc::from("app"), LogLevel::Warn, "disk almost full".into())
            .with_location(SourceLocation::new("src/main.rs", 12, "app::main"));

        assert_eq!(record.logger_name(), "app");
        assert_eq!(record.level(), LogLevel::Warn);
        assert_eq!(record.message().unwrap(), "disk almost full");
        assert_eq!(record.location().map(|l| l.line), Some(12));
        assert_eq!(record.thread_id(), format!("{:?}", std::thread::current().id()));
    }

    #[test]
    fn test_thread_name_is_cached_per_thread() {
        let handle = std::thread::Builder::new()
            .name("worker-a".to_string())
            .spawn(|| {
                let record = LogRecord::new(Arc::from("app"), LogLevel::Info, "x".into());
                record.thread_label().to_string()
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), "worker-a");
    }
}
