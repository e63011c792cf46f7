//! Overflow policies for the bounded work queue
//!
//! When the queue is at capacity, the policy decides whether the producer
//! waits, an older entry makes room, or the new entry is dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Policy applied by `enqueue` when the queue is full
///
/// Flush requests and terminate signals are always enqueued with
/// [`OverflowPolicy::Block`] semantics, whatever the configured policy.
///
/// # Example
///
/// ```
/// use rust_async_logger::OverflowPolicy;
///
/// let policy: OverflowPolicy = "overrun_oldest".parse().unwrap();
/// assert_eq!(policy, OverflowPolicy::OverrunOldest);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Wait until a consumer frees a slot
    ///
    /// Nothing is lost; the producer's latency is unbounded.
    #[default]
    Block,

    /// Evict the oldest queued log entry to make room
    ///
    /// Control items (flush, terminate) are never evicted. A queue holding
    /// only control items makes the producer wait as with `Block`.
    OverrunOldest,

    /// Drop the incoming entry and return immediately
    ///
    /// The drop is counted, not reported as an error.
    DiscardNew,
}

impl OverflowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverflowPolicy::Block => "block",
            OverflowPolicy::OverrunOldest => "overrun_oldest",
            OverflowPolicy::DiscardNew => "discard_new",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "overrun_oldest" => Ok(OverflowPolicy::OverrunOldest),
            "discard_new" => Ok(OverflowPolicy::DiscardNew),
            _ => Err(format!("Invalid overflow policy: '{}'", s)),
        }
    }
}
