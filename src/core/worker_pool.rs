//! Worker threads that drain the shared queue on behalf of async loggers

use super::{
    backpressure_queue::{BackpressureQueue, EnqueueOutcome, Evictable},
    config::PoolConfig,
    error::{LoggerError, Result},
    log_record::LogRecord,
    logger::{panic_message, Log, Logger},
    metrics::QueueMetrics,
    overflow_policy::OverflowPolicy,
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Hook run on each worker thread when it starts or stops.
pub type ThreadHook = Arc<dyn Fn() + Send + Sync>;

/// Unit of work travelling through the pool queue.
pub enum WorkItem {
    /// Deliver one record through the logger's synchronous dispatch
    Log { logger: Arc<Logger>, record: LogRecord },
    /// Flush every destination of the logger; `done` receives the outcome
    Flush {
        logger: Arc<Logger>,
        done: Option<Sender<Result<()>>>,
    },
    /// Ends the worker that dequeues it
    Terminate,
}

impl Evictable for WorkItem {
    fn is_evictable(&self) -> bool {
        matches!(self, WorkItem::Log { .. })
    }
}

/// Fixed set of threads consuming one [`BackpressureQueue`].
///
/// Several async loggers may share a pool. Teardown is explicit: call
/// [`shutdown`](Self::shutdown), which queues one terminate signal per worker
/// behind all pending work and joins the threads.
pub struct WorkerPool {
    queue: Arc<BackpressureQueue<WorkItem>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
    worker_count: usize,
    exits: Receiver<usize>,
    exited: AtomicUsize,
}

impl WorkerPool {
    /// Start `worker_count` threads draining a queue of `queue_capacity` items.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_async_logger::{OverflowPolicy, WorkerPool};
    ///
    /// let pool = WorkerPool::new(1024, 1, OverflowPolicy::Block).unwrap();
    /// assert_eq!(pool.worker_count(), 1);
    /// pool.shutdown().unwrap();
    /// ```
    pub fn new(
        queue_capacity: usize,
        worker_count: usize,
        overflow_policy: OverflowPolicy,
    ) -> Result<Self> {
        Self::builder()
            .queue_capacity(queue_capacity)
            .worker_count(worker_count)
            .overflow_policy(overflow_policy)
            .build()
    }

    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        Self::builder().config(config.clone()).build()
    }

    #[must_use]
    pub fn builder() -> WorkerPoolBuilder {
        WorkerPoolBuilder::new()
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// The shared queue. Pushing items directly bypasses the shutdown protocol.
    pub fn queue(&self) -> &Arc<BackpressureQueue<WorkItem>> {
        &self.queue
    }

    pub fn metrics(&self) -> &QueueMetrics {
        self.queue.metrics()
    }

    pub fn is_shut_down(&self) -> bool {
        self.queue.is_closed()
    }

    /// Queue a record under the configured overflow policy.
    pub fn post_log(&self, logger: Arc<Logger>, record: LogRecord) -> Result<EnqueueOutcome> {
        self.queue.enqueue(WorkItem::Log { logger, record })
    }

    /// Queue a flush request; always waits for space rather than dropping it.
    pub fn post_flush(
        &self,
        logger: Arc<Logger>,
        done: Option<Sender<Result<()>>>,
    ) -> Result<()> {
        self.queue
            .enqueue_blocking(WorkItem::Flush { logger, done })
            .map(|_| ())
    }

    /// Drain pending work, stop every worker and join them.
    ///
    /// Work queued before this call is executed; work offered afterwards is
    /// rejected with [`LoggerError::PoolShutdown`]. Calling it again is a no-op.
    pub fn shutdown(&self) -> Result<()> {
        self.close();
        self.wait_for_exits(None);
        Ok(())
    }

    /// Like [`shutdown`](Self::shutdown), but stop waiting after `timeout`.
    ///
    /// Returns `Ok(false)` if some workers were still running; they are left
    /// to finish on their own, never killed.
    pub fn shutdown_timeout(&self, timeout: Duration) -> Result<bool> {
        self.close();
        Ok(self.wait_for_exits(Some(Instant::now() + timeout)))
    }

    /// Wait up to `timeout` for every worker to exit, joining them if they did.
    ///
    /// Does not send terminate signals itself.
    pub fn join_timeout(&self, timeout: Duration) -> bool {
        self.wait_for_exits(Some(Instant::now() + timeout))
    }

    fn close(&self) {
        let signals = (0..self.worker_count).map(|_| WorkItem::Terminate);
        // Err: closed by an earlier shutdown, its signals are already queued
        let _ = self.queue.close_with(signals);
    }

    fn wait_for_exits(&self, deadline: Option<Instant>) -> bool {
        while self.exited.load(Ordering::Acquire) < self.worker_count {
            let notice = match deadline {
                Some(deadline) => self.exits.recv_deadline(deadline).ok(),
                None => self.exits.recv().ok(),
            };
            match notice {
                Some(_) => {
                    self.exited.fetch_add(1, Ordering::AcqRel);
                }
                None => return false,
            }
        }

        let handles = std::mem::take(&mut *self.workers.lock());
        for handle in handles {
            if let Err(e) = handle.join() {
                eprintln!("[LOGGER ERROR] Worker thread panicked during shutdown: {:?}", e);
            }
        }
        true
    }
}

impl Drop for WorkerPool {
    /// Dropping a pool that was never shut down does not wait for it.
    ///
    /// The workers are detached: terminate signals are queued behind pending
    /// work so they drain it and exit, but nothing joins them.
    fn drop(&mut self) {
        if self.queue.is_closed() {
            return;
        }
        eprintln!(
            "[LOGGER WARNING] Worker pool dropped without shutdown(); \
             {} worker(s) detached, queued records are delivered in the background.",
            self.worker_count
        );
        self.close();
    }
}

/// Sends the worker's index when its thread ends, however it ends.
struct ExitNotice {
    index: usize,
    exits: Sender<usize>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        let _ = self.exits.send(self.index);
    }
}

fn worker_loop(queue: &BackpressureQueue<WorkItem>) {
    loop {
        let item = queue.dequeue();
        if matches!(item, WorkItem::Terminate) {
            break;
        }

        // Outermost guard: nothing a handler does may end this thread.
        if let Err(panic_info) = panic::catch_unwind(AssertUnwindSafe(|| process(item))) {
            eprintln!(
                "[LOGGER CRITICAL] Error handler panicked on worker thread: {}. \
                 Worker continues.",
                panic_message(panic_info.as_ref())
            );
        }
    }
}

fn process(item: WorkItem) {
    match item {
        WorkItem::Log { logger, record } => {
            if let Err(e) = logger.dispatch(&record) {
                eprintln!(
                    "[LOGGER ERROR] Error handler of logger '{}' failed: {}",
                    logger.name(),
                    e
                );
            }
        }
        WorkItem::Flush { logger, done } => {
            let result = logger.flush_destinations();
            match done {
                Some(done) => {
                    let _ = done.send(result);
                }
                None => {
                    if let Err(e) = result {
                        eprintln!(
                            "[LOGGER ERROR] Error handler of logger '{}' failed during flush: {}",
                            logger.name(),
                            e
                        );
                    }
                }
            }
        }
        WorkItem::Terminate => {}
    }
}

/// Builder for [`WorkerPool`]
///
/// # Example
/// ```
/// use rust_async_logger::{OverflowPolicy, WorkerPool};
/// use std::sync::Arc;
///
/// let pool = WorkerPool::builder()
///     .queue_capacity(4096)
///     .worker_count(2)
///     .overflow_policy(OverflowPolicy::OverrunOldest)
///     .thread_name_prefix("audit-log")
///     .on_thread_start(Arc::new(|| println!("worker up")))
///     .build()
///     .unwrap();
/// pool.shutdown().unwrap();
/// ```
pub struct WorkerPoolBuilder {
    config: PoolConfig,
    on_thread_start: Option<ThreadHook>,
    on_thread_stop: Option<ThreadHook>,
}

impl WorkerPoolBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
            on_thread_start: None,
            on_thread_stop: None,
        }
    }

    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: PoolConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.config.overflow_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_thread_start(mut self, hook: ThreadHook) -> Self {
        self.on_thread_start = Some(hook);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn on_thread_stop(mut self, hook: ThreadHook) -> Self {
        self.on_thread_stop = Some(hook);
        self
    }

    pub fn build(self) -> Result<WorkerPool> {
        self.config.validate()?;
        let queue = Arc::new(BackpressureQueue::new(
            self.config.queue_capacity,
            self.config.overflow_policy,
        )?);
        let (exit_tx, exit_rx) = unbounded();

        let mut workers = Vec::with_capacity(self.config.worker_count);
        for index in 0..self.config.worker_count {
            let queue_clone = Arc::clone(&queue);
            let notice = ExitNotice {
                index,
                exits: exit_tx.clone(),
            };
            let on_start = self.on_thread_start.clone();
            let on_stop = self.on_thread_stop.clone();

            let spawned = thread::Builder::new()
                .name(format!("{}-{}", self.config.thread_name_prefix, index))
                .spawn(move || {
                    let _notice = notice;
                    if let Some(hook) = on_start {
                        hook();
                    }
                    worker_loop(&queue_clone);
                    if let Some(hook) = on_stop {
                        hook();
                    }
                });

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // stop the workers that did start before reporting
                    let started = workers.len();
                    let _ = queue.close_with((0..started).map(|_| WorkItem::Terminate));
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(LoggerError::io_operation(
                        "spawning worker thread",
                        format!("worker {} of {}", index, self.config.worker_count),
                        e,
                    ));
                }
            }
        }

        Ok(WorkerPool {
            queue,
            workers: Mutex::new(workers),
            worker_count: self.config.worker_count,
            exits: exit_rx,
            exited: AtomicUsize::new(0),
        })
    }
}

impl Default for WorkerPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
