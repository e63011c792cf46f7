//! Locking policies for destinations
//!
//! A destination picks its policy by type parameter when it is constructed.
//! The policy only governs the destination's own critical section; callers
//! see the same [`Destination`](super::Destination) contract either way.

use parking_lot::Mutex;

pub trait LockPolicy: Send + Sync + 'static {
    type Lock<T: Send>: Send + Sync;

    /// Short label used in diagnostics (`"mt"` / `"st"`).
    const LABEL: &'static str;

    fn new_lock<T: Send>(value: T) -> Self::Lock<T>;

    /// Run `f` with exclusive access to the guarded value.
    ///
    /// Returns `None` when the policy refuses access instead of waiting.
    fn with_lock<T: Send, R>(lock: &Self::Lock<T>, f: impl FnOnce(&mut T) -> R) -> Option<R>;
}

/// Serializes every operation; concurrent callers wait their turn.
///
/// Required for destinations shared between threads or attached to a
/// worker pool with more than one worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Synchronized;

impl LockPolicy for Synchronized {
    type Lock<T: Send> = Mutex<T>;

    const LABEL: &'static str = "mt";

    fn new_lock<T: Send>(value: T) -> Mutex<T> {
        Mutex::new(value)
    }

    fn with_lock<T: Send, R>(lock: &Mutex<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = lock.lock();
        Some(f(&mut guard))
    }
}

/// Never waits. Valid only when the embedder guarantees a single caller at
/// a time; an overlapping caller is turned away and the destination reports
/// [`LoggerError::ConcurrentAccess`](super::LoggerError::ConcurrentAccess).
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsynchronized;

impl LockPolicy for Unsynchronized {
    type Lock<T: Send> = Mutex<T>;

    const LABEL: &'static str = "st";

    fn new_lock<T: Send>(value: T) -> Mutex<T> {
        Mutex::new(value)
    }

    fn with_lock<T: Send, R>(lock: &Mutex<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        lock.try_lock().map(|mut guard| f(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_synchronized_waits_for_holder() {
        let lock = Arc::new(Synchronized::new_lock(0u32));
        let (entered_tx, entered_rx) = unbounded();
        let (release_tx, release_rx) = unbounded::<()>();

        let holder = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                Synchronized::with_lock(&*lock, |value| {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    *value += 1;
                })
            })
        };

        entered_rx.recv().unwrap();
        release_tx.send(()).unwrap();
        let result = Synchronized::with_lock(&*lock, |value| {
            *value += 1;
            *value
        });
        holder.join().unwrap();
        assert_eq!(result, Some(2));
    }

    #[test]
    fn test_unsynchronized_refuses_overlap() {
        let lock = Arc::new(Unsynchronized::new_lock(Vec::<u32>::new()));
        let (entered_tx, entered_rx) = unbounded();
        let (release_tx, release_rx) = unbounded::<()>();

        let holder = {
            let lock = Arc::clone(&lock);
            thread::spawn(move || {
                Unsynchronized::with_lock(&*lock, |values| {
                    values.push(1);
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                })
            })
        };

        entered_rx.recv().unwrap();
        assert!(Unsynchronized::with_lock(&*lock, |values| values.push(2)).is_none());
        release_tx.send(()).unwrap();
        holder.join().unwrap();

        assert_eq!(Unsynchronized::with_lock(&*lock, |values| values.clone()), Some(vec![1]));
    }
}
