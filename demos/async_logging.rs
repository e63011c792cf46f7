//! Async logging example
//!
//! Two components share one worker pool; records are delivered to the
//! console and to a file off the calling threads.
//!
//! Run with: cargo run --example async_logging

use rust_async_logger::prelude::*;
use rust_async_logger::{info, warn};
use std::sync::Arc;
use std::thread;

fn main() -> Result<()> {
    println!("=== Rust Async Logger - Async Logging Example ===\n");

    let pool = Arc::new(
        WorkerPool::builder()
            .queue_capacity(1024)
            .worker_count(2)
            .overflow_policy(OverflowPolicy::Block)
            .build()?,
    );

    let console = Arc::new(ConsoleDestinationMt::split());
    let file = Arc::new(FileDestinationMt::truncating("async_test.log")?);

    let http = Logger::builder("http")
        .level(LogLevel::Debug)
        .flush_level(LogLevel::Error)
        .destination(Arc::clone(&console))
        .destination(Arc::clone(&file))
        .build_async(&pool);
    let db = Logger::builder("db")
        .destination(Arc::clone(&file))
        .build_async(&pool);

    println!("1. Logging from several threads:");
    let handles: Vec<_> = (0..4)
        .map(|thread_id| {
            let http = http.clone();
            thread::spawn(move || -> Result<()> {
                for i in 0..5 {
                    info!(http, "thread {} handled request {}", thread_id, i)?;
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer panicked")?;
    }

    warn!(db, "connection pool at {}% capacity", 85)?;
    http.error("upstream timed out")?;

    println!("\n2. Waiting for queued records to be written:");
    http.flush_and_wait()?;

    let metrics = pool.metrics();
    println!(
        "   enqueued={} dequeued={} lost={:.1}%",
        metrics.enqueued_count(),
        metrics.dequeued_count(),
        metrics.loss_rate()
    );

    pool.shutdown()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'async_test.log' for file output");
    Ok(())
}
