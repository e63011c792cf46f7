//! Criterion benchmarks for rust_async_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_async_logger::prelude::*;
use rust_async_logger::{info, BackpressureQueue, Evictable, Formatter};
use std::sync::Arc;

/// Renders every record and throws the bytes away.
struct NullDestination {
    formatter: StandardFormatter,
}

impl NullDestination {
    fn new() -> Self {
        Self {
            formatter: StandardFormatter::new(),
        }
    }
}

impl Destination for NullDestination {
    fn emit(&self, record: &LogRecord) -> rust_async_logger::Result<()> {
        black_box(self.formatter.render(record)?);
        Ok(())
    }

    fn flush(&self) -> rust_async_logger::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn null_logger(name: &str) -> Logger {
    Logger::with_destination(name, Arc::new(NullDestination::new()))
}

// ============================================================================
// Synchronous Logging Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger("bench");
    logger.set_level(LogLevel::Trace);

    group.bench_function("static_message", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("macro_formatted", |b| {
        b.iter(|| info!(logger, "request {} took {}ms", black_box(42), black_box(17)));
    });

    group.finish();
}

// ============================================================================
// Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger("filtered");
    logger.set_level(LogLevel::Warn);

    group.bench_function("below_threshold_macro", |b| {
        b.iter(|| rust_async_logger::debug!(logger, "filtered {}", black_box(1)));
    });

    group.bench_function("below_threshold_deferred", |b| {
        b.iter(|| logger.debug(Payload::deferred(|f| f.write_str("never rendered"))));
    });

    group.bench_function("above_threshold", |b| {
        b.iter(|| logger.error(black_box("This should be logged")));
    });

    group.finish();
}

// ============================================================================
// Async Logging Benchmarks
// ============================================================================

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    for policy in [
        OverflowPolicy::Block,
        OverflowPolicy::OverrunOldest,
        OverflowPolicy::DiscardNew,
    ] {
        let pool = Arc::new(WorkerPool::new(10_000, 1, policy).unwrap());
        let logger = AsyncLogger::from_logger(null_logger("async"), &pool);

        group.bench_function(policy.as_str(), |b| {
            b.iter(|| logger.info(black_box("Async message")));
        });

        pool.shutdown().unwrap();
    }

    group.finish();
}

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    let pool = Arc::new(WorkerPool::new(10_000, 2, OverflowPolicy::Block).unwrap());
    let logger = AsyncLogger::from_logger(null_logger("concurrent"), &pool);

    group.bench_function("multi_thread_4", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let logger = logger.clone();
                    std::thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = logger.info(black_box("Concurrent message"));
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    pool.shutdown().unwrap();
}

// ============================================================================
// Queue and Formatting Benchmarks
// ============================================================================

struct Slot(u64);

impl Evictable for Slot {
    fn is_evictable(&self) -> bool {
        true
    }
}

fn bench_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("backpressure_queue");
    group.throughput(Throughput::Elements(1));

    let queue = BackpressureQueue::new(1024, OverflowPolicy::Block).unwrap();
    group.bench_function("enqueue_dequeue", |b| {
        b.iter(|| {
            queue.enqueue(Slot(black_box(7))).unwrap();
            black_box(queue.dequeue().0)
        });
    });

    let full = BackpressureQueue::new(64, OverflowPolicy::OverrunOldest).unwrap();
    for i in 0..64 {
        full.enqueue(Slot(i)).unwrap();
    }
    group.bench_function("overrun_full_queue", |b| {
        b.iter(|| full.enqueue(Slot(black_box(7))).unwrap());
    });

    group.finish();
}

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let record = LogRecord::new(Arc::from("bench"), LogLevel::Info, Payload::from("Test message"));
    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Logfmt] {
        let formatter = StandardFormatter::new().with_output_format(format.clone());
        group.bench_function(format!("{:?}", format), |b| {
            b.iter(|| black_box(formatter.render(&record).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sync_logging,
    bench_level_filtering,
    bench_async_logging,
    bench_concurrent_logging,
    bench_queue,
    bench_formatting,
);

criterion_main!(benches);
