//! Bounded multi-producer/multi-consumer queue with overflow policies
//!
//! The queue is the only synchronization point between application threads
//! and worker threads. All insertion decisions (wait, evict, reject) are taken
//! under its single mutex, so an eviction and the insertion that caused it are
//! one atomic step.

use super::error::{LoggerError, Result};
use super::metrics::QueueMetrics;
use super::overflow_policy::OverflowPolicy;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Tells the queue which items `OverrunOldest` may throw away.
pub trait Evictable {
    fn is_evictable(&self) -> bool;
}

/// What happened to an item handed to [`BackpressureQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Queued; nothing was lost
    Accepted,
    /// Queued after evicting the oldest evictable item
    Overrun,
    /// Rejected because the queue was full; the item was dropped
    Discarded,
}

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

pub struct BackpressureQueue<T> {
    capacity: usize,
    policy: OverflowPolicy,
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    metrics: QueueMetrics,
}

impl<T: Evictable> BackpressureQueue<T> {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config(
                "BackpressureQueue",
                "capacity must be a positive integer",
            ));
        }

        Ok(Self {
            capacity,
            policy,
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            metrics: QueueMetrics::new(),
        })
    }

    /// Insert `item`, applying the configured overflow policy if the queue is full.
    ///
    /// Items that are not evictable always get `Block` semantics.
    /// Fails only if the queue has been closed.
    pub fn enqueue(&self, item: T) -> Result<EnqueueOutcome> {
        self.push(item, self.policy)
    }

    /// Insert `item`, waiting for a free slot regardless of the policy.
    pub fn enqueue_blocking(&self, item: T) -> Result<EnqueueOutcome> {
        self.push(item, OverflowPolicy::Block)
    }

    fn push(&self, item: T, policy: OverflowPolicy) -> Result<EnqueueOutcome> {
        let policy = if item.is_evictable() {
            policy
        } else {
            OverflowPolicy::Block
        };

        // Declared before the guard so an evicted item is dropped after unlock;
        // its Drop may run arbitrary code, including another enqueue.
        let mut evicted = None;
        let mut state = self.state.lock();
        let mut outcome = EnqueueOutcome::Accepted;
        let mut waited = false;

        loop {
            if state.closed {
                return Err(LoggerError::pool_shutdown(
                    "queue is closed; no worker will consume this item",
                ));
            }
            if state.items.len() < self.capacity {
                break;
            }

            match policy {
                OverflowPolicy::DiscardNew => {
                    self.metrics.record_discarded();
                    return Ok(EnqueueOutcome::Discarded);
                }
                OverflowPolicy::OverrunOldest => {
                    if let Some(pos) = state.items.iter().position(Evictable::is_evictable) {
                        evicted = state.items.remove(pos);
                        self.metrics.record_overrun();
                        outcome = EnqueueOutcome::Overrun;
                        break;
                    }
                    // only control items queued: wait like Block
                }
                OverflowPolicy::Block => {}
            }

            if !waited {
                self.metrics.record_blocked();
                waited = true;
            }
            self.not_full.wait(&mut state);
        }

        state.items.push_back(item);
        self.metrics.record_enqueued();
        drop(state);
        self.not_empty.notify_one();
        drop(evicted);
        Ok(outcome)
    }

    /// Remove the oldest item, waiting until one is available.
    pub fn dequeue(&self) -> T {
        let mut state = self.state.lock();
        let item = loop {
            if let Some(item) = state.items.pop_front() {
                break item;
            }
            self.not_empty.wait(&mut state);
        };
        self.finish_pop(state);
        item
    }

    /// Like [`dequeue`](Self::dequeue) but gives up after `timeout`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        let item = loop {
            if let Some(item) = state.items.pop_front() {
                break item;
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                match state.items.pop_front() {
                    Some(item) => break item,
                    None => return None,
                }
            }
        };
        self.finish_pop(state);
        Some(item)
    }

    pub fn try_dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        let item = state.items.pop_front()?;
        self.finish_pop(state);
        Some(item)
    }

    fn finish_pop(&self, state: parking_lot::MutexGuard<'_, QueueState<T>>) {
        let closed = state.closed;
        drop(state);
        self.metrics.record_dequeued();
        if closed {
            // producers rejected after close do not pass their wakeup on
            self.not_full.notify_all();
        } else {
            self.not_full.notify_one();
        }
    }

    /// Close the queue and append `final_items` behind everything already queued.
    ///
    /// From this point every `enqueue` fails, including producers currently
    /// waiting for space. The final items are inserted with `Block` semantics,
    /// so this call waits for consumers if the queue is full.
    pub fn close_with(&self, final_items: impl IntoIterator<Item = T>) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::pool_shutdown("queue is already closed"));
        }
        state.closed = true;
        self.not_full.notify_all();

        for item in final_items {
            if state.items.len() >= self.capacity {
                self.metrics.record_blocked();
                while state.items.len() >= self.capacity {
                    self.not_full.wait(&mut state);
                }
            }
            state.items.push_back(item);
            self.metrics.record_enqueued();
            self.not_empty.notify_one();
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn metrics(&self) -> &QueueMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Item {
        Entry(u32),
        Control(u32),
    }

    impl Evictable for Item {
        fn is_evictable(&self) -> bool {
            matches!(self, Item::Entry(_))
        }
    }

    fn drain(queue: &BackpressureQueue<Item>) -> Vec<Item> {
        std::iter::from_fn(|| queue.try_dequeue()).collect()
    }

    /// Wait until a producer thread is parked inside `enqueue`.
    fn wait_for_blocked(queue: &BackpressureQueue<Item>, expected: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while queue.metrics().blocked_count() < expected {
            assert!(Instant::now() < deadline, "producer never blocked");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BackpressureQueue::<Item>::new(0, OverflowPolicy::Block);
        assert!(matches!(result, Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_block_preserves_order_through_small_queue() {
        let queue = Arc::new(BackpressureQueue::new(4, OverflowPolicy::Block).unwrap());
        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..100 {
                    assert_eq!(queue.enqueue(Item::Entry(i)).unwrap(), EnqueueOutcome::Accepted);
                }
            })
        };

        let received: Vec<Item> = (0..100).map(|_| queue.dequeue()).collect();
        producer.join().unwrap();

        let expected: Vec<Item> = (0..100).map(Item::Entry).collect();
        assert_eq!(received, expected);
        assert_eq!(queue.metrics().overrun_count(), 0);
        assert_eq!(queue.metrics().discarded_count(), 0);
    }

    #[test]
    fn test_block_waits_for_free_slot() {
        let queue = Arc::new(BackpressureQueue::new(1, OverflowPolicy::Block).unwrap());
        queue.enqueue(Item::Entry(1)).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(Item::Entry(2)).unwrap())
        };
        wait_for_blocked(&queue, 1);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.dequeue(), Item::Entry(1));
        assert_eq!(producer.join().unwrap(), EnqueueOutcome::Accepted);
        assert_eq!(queue.dequeue(), Item::Entry(2));
    }

    #[test]
    fn test_overrun_keeps_newest_entries() {
        let queue = BackpressureQueue::new(3, OverflowPolicy::OverrunOldest).unwrap();
        for i in 1..=3 {
            assert_eq!(queue.enqueue(Item::Entry(i)).unwrap(), EnqueueOutcome::Accepted);
        }
        assert_eq!(queue.enqueue(Item::Entry(4)).unwrap(), EnqueueOutcome::Overrun);

        assert_eq!(drain(&queue), vec![Item::Entry(2), Item::Entry(3), Item::Entry(4)]);
        assert_eq!(queue.metrics().overrun_count(), 1);
    }

    #[test]
    fn test_overrun_never_evicts_control_items() {
        let queue = BackpressureQueue::new(3, OverflowPolicy::OverrunOldest).unwrap();
        queue.enqueue(Item::Control(0)).unwrap();
        queue.enqueue(Item::Entry(1)).unwrap();
        queue.enqueue(Item::Entry(2)).unwrap();

        queue.enqueue(Item::Entry(3)).unwrap();
        queue.enqueue(Item::Entry(4)).unwrap();

        assert_eq!(
            drain(&queue),
            vec![Item::Control(0), Item::Entry(3), Item::Entry(4)]
        );
    }

    /// Entry whose drop enqueues a follow-up into the queue that evicted it.
    struct Chained {
        id: u32,
        follow_up: Option<Arc<BackpressureQueue<Chained>>>,
    }

    impl Evictable for Chained {
        fn is_evictable(&self) -> bool {
            true
        }
    }

    impl Drop for Chained {
        fn drop(&mut self) {
            if let Some(queue) = self.follow_up.take() {
                let _ = queue.enqueue(Chained { id: self.id + 100, follow_up: None });
            }
        }
    }

    #[test]
    fn test_evicted_item_dropped_outside_lock() {
        let queue = Arc::new(BackpressureQueue::new(2, OverflowPolicy::OverrunOldest).unwrap());
        queue
            .enqueue(Chained { id: 1, follow_up: Some(Arc::clone(&queue)) })
            .unwrap();
        queue.enqueue(Chained { id: 2, follow_up: None }).unwrap();

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let outcome = queue.enqueue(Chained { id: 3, follow_up: None });
                let _ = done_tx.send(outcome.map_err(|e| e.to_string()));
            });
        }

        let outcome = done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("enqueue deadlocked while dropping the evicted item");
        assert_eq!(outcome.unwrap(), EnqueueOutcome::Overrun);

        let ids: Vec<u32> = std::iter::from_fn(|| queue.try_dequeue()).map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 101]);
        assert_eq!(queue.metrics().overrun_count(), 2);
    }

    #[test]
    fn test_overrun_with_only_control_items_blocks() {
        let queue = Arc::new(BackpressureQueue::new(2, OverflowPolicy::OverrunOldest).unwrap());
        queue.enqueue(Item::Control(1)).unwrap();
        queue.enqueue(Item::Control(2)).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(Item::Entry(3)).unwrap())
        };
        wait_for_blocked(&queue, 1);

        assert_eq!(queue.dequeue(), Item::Control(1));
        assert_eq!(producer.join().unwrap(), EnqueueOutcome::Accepted);
        assert_eq!(drain(&queue), vec![Item::Control(2), Item::Entry(3)]);
    }

    #[test]
    fn test_discard_new_drops_incoming() {
        let queue = BackpressureQueue::new(2, OverflowPolicy::DiscardNew).unwrap();
        queue.enqueue(Item::Entry(1)).unwrap();
        queue.enqueue(Item::Entry(2)).unwrap();

        let started = Instant::now();
        assert_eq!(queue.enqueue(Item::Entry(3)).unwrap(), EnqueueOutcome::Discarded);
        assert!(started.elapsed() < Duration::from_secs(1));

        assert_eq!(drain(&queue), vec![Item::Entry(1), Item::Entry(2)]);
        assert_eq!(queue.metrics().discarded_count(), 1);
    }

    #[test]
    fn test_discard_new_still_blocks_control_items() {
        let queue = Arc::new(BackpressureQueue::new(1, OverflowPolicy::DiscardNew).unwrap());
        queue.enqueue(Item::Entry(1)).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(Item::Control(2)).unwrap())
        };
        wait_for_blocked(&queue, 1);

        assert_eq!(queue.dequeue(), Item::Entry(1));
        assert_eq!(producer.join().unwrap(), EnqueueOutcome::Accepted);
        assert_eq!(queue.dequeue(), Item::Control(2));
    }

    #[test]
    fn test_close_rejects_new_items_and_keeps_queued_ones() {
        let queue = BackpressureQueue::new(4, OverflowPolicy::Block).unwrap();
        queue.enqueue(Item::Entry(1)).unwrap();
        queue.close_with([Item::Control(9)]).unwrap();

        assert!(queue.is_closed());
        assert!(matches!(
            queue.enqueue(Item::Entry(2)),
            Err(LoggerError::PoolShutdown(_))
        ));
        assert!(queue.close_with([Item::Control(10)]).is_err());
        assert_eq!(drain(&queue), vec![Item::Entry(1), Item::Control(9)]);
    }

    #[test]
    fn test_close_releases_blocked_producer_with_error() {
        let queue = Arc::new(BackpressureQueue::new(1, OverflowPolicy::Block).unwrap());
        queue.enqueue(Item::Entry(1)).unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.enqueue(Item::Entry(2)))
        };
        wait_for_blocked(&queue, 1);

        let closer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.close_with([Item::Control(3)]))
        };

        assert!(producer.join().unwrap().is_err());
        assert_eq!(queue.dequeue(), Item::Entry(1));
        closer.join().unwrap().unwrap();
        assert_eq!(queue.dequeue(), Item::Control(3));
    }

    #[test]
    fn test_dequeue_timeout_on_empty_queue() {
        let queue = BackpressureQueue::<Item>::new(1, OverflowPolicy::Block).unwrap();
        assert_eq!(queue.dequeue_timeout(Duration::from_millis(20)), None);
    }
}
