//! Time-gated flush trigger.
//!
//! The scheduler is only consulted when a message arrives, so it bounds the
//! flush cadence from below; a quiet feed produces no flushes at all.

use std::time::{Duration, Instant};

/// Default minimum time between two flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct FlushScheduler {
    interval: Duration,
    last_flush: Instant,
}

impl FlushScheduler {
    /// Creates a scheduler whose interval starts counting now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        FlushScheduler {
            interval,
            last_flush: start,
        }
    }

    /// True iff strictly more than `interval` has passed since the last flush.
    pub fn should_flush(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_flush) > self.interval
    }

    pub fn mark_flushed(&mut self, now: Instant) {
        self.last_flush = now;
    }

    /// Checks and, when due, marks the flush at `now`.
    ///
    /// The mark happens before the caller aggregates, so neither slow
    /// rendering nor a failed aggregation shifts the next deadline.
    pub fn poll(&mut self, now: Instant) -> bool {
        let due = self.should_flush(now);
        if due {
            self.mark_flushed(now);
        }
        due
    }

    pub fn last_flush(&self) -> Instant {
        self.last_flush
    }
}
