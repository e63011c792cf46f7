//! Formatter + backend pair guarded by a lock policy

use crate::core::{
    Destination, Formatter, LockPolicy, LogLevel, LogRecord, LoggerError, Result,
    StandardFormatter, Synchronized,
};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU8, Ordering};

/// The raw medium behind a [`LockedDestination`].
///
/// Backends see already rendered bytes and are only ever entered through the
/// destination's lock, so they take `&mut self` and keep no synchronization
/// of their own.
pub trait Backend: Send + 'static {
    /// Write one rendered record. `record` is passed for routing decisions only.
    fn write(&mut self, record: &LogRecord, bytes: &[u8]) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// A [`Destination`] built from a [`Formatter`] and a [`Backend`].
///
/// `P` selects the locking policy at construction time. Use the `*Mt`
/// aliases for destinations shared between threads and the `*St` aliases
/// when a single caller is guaranteed.
pub struct LockedDestination<B: Backend, P: LockPolicy = Synchronized> {
    name: String,
    formatter: Box<dyn Formatter>,
    level: AtomicU8,
    backend: P::Lock<B>,
    _policy: PhantomData<P>,
}

impl<B: Backend, P: LockPolicy> LockedDestination<B, P> {
    /// Wrap `backend` with the standard text formatter and no level filter.
    pub fn with_backend(name: impl Into<String>, backend: B) -> Self {
        Self {
            name: name.into(),
            formatter: Box::new(StandardFormatter::new()),
            level: AtomicU8::new(LogLevel::Trace as u8),
            backend: P::new_lock(backend),
            _policy: PhantomData,
        }
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Minimum level this destination accepts, independent of the logger's.
    #[must_use]
    pub fn with_level(self, level: LogLevel) -> Self {
        self.set_level(level);
        self
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// Run `f` against the backend under the destination's lock.
    ///
    /// `None` means an unsynchronized destination was busy.
    pub fn with_backend_mut<R>(&self, f: impl FnOnce(&mut B) -> R) -> Option<R> {
        P::with_lock(&self.backend, f)
    }

    fn busy(&self) -> LoggerError {
        LoggerError::concurrent_access(format!("{} ({})", self.name, P::LABEL))
    }
}

impl<B: Backend, P: LockPolicy> Destination for LockedDestination<B, P> {
    fn emit(&self, record: &LogRecord) -> Result<()> {
        let bytes = self.formatter.render(record)?;
        self.with_backend_mut(|backend| backend.write(record, &bytes))
            .ok_or_else(|| self.busy())?
    }

    fn flush(&self) -> Result<()> {
        self.with_backend_mut(B::flush)
            .ok_or_else(|| self.busy())?
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn should_emit(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }
}
