//! Logger metrics for observability
//!
//! Counters for the life of every entry: accepted into the queue, dropped
//! before enqueue, dispatched, and failed at a destination.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use level_file_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_enqueued();
/// metrics.record_dispatched();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.dispatched(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Entries accepted into the queue
    enqueued: AtomicU64,

    /// Entries dropped because their level name is not registered
    dropped_unknown_level: AtomicU64,

    /// Entries dropped because their rank is below the minimum
    dropped_below_threshold: AtomicU64,

    /// Entries fully processed by the dispatch thread
    dispatched: AtomicU64,

    /// Failed writes across all destinations
    write_errors: AtomicU64,

    /// Times a producer found the queue full and had to wait
    queue_full_events: AtomicU64,
}

impl LoggerMetrics {
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dropped_unknown_level: AtomicU64::new(0),
            dropped_below_threshold: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            queue_full_events: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_unknown_level(&self) -> u64 {
        self.dropped_unknown_level.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped_below_threshold(&self) -> u64 {
        self.dropped_below_threshold.load(Ordering::Relaxed)
    }

    /// Total entries discarded before reaching the queue
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_unknown_level() + self.dropped_below_threshold()
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_full_events(&self) -> u64 {
        self.queue_full_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_unknown_level(&self) -> u64 {
        self.dropped_unknown_level.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_below_threshold(&self) -> u64 {
        self.dropped_below_threshold.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_write_error(&self) -> u64 {
        self.write_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_queue_full(&self) -> u64 {
        self.queue_full_events.fetch_add(1, Ordering::Relaxed)
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dropped_unknown_level.store(0, Ordering::Relaxed);
        self.dropped_below_threshold.store(0, Ordering::Relaxed);
        self.dispatched.store(0, Ordering::Relaxed);
        self.write_errors.store(0, Ordering::Relaxed);
        self.queue_full_events.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            dropped_unknown_level: AtomicU64::new(self.dropped_unknown_level()),
            dropped_below_threshold: AtomicU64::new(self.dropped_below_threshold()),
            dispatched: AtomicU64::new(self.dispatched()),
            write_errors: AtomicU64::new(self.write_errors()),
            queue_full_events: AtomicU64::new(self.queue_full_events()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.dropped_count(), 0);
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.write_errors(), 0);
        assert_eq!(metrics.queue_full_events(), 0);
    }

    #[test]
    fn test_record_returns_previous_value() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_unknown_level(), 0);
        assert_eq!(metrics.record_unknown_level(), 1);
        metrics.record_below_threshold();
        assert_eq!(metrics.dropped_unknown_level(), 2);
        assert_eq!(metrics.dropped_count(), 3);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = LoggerMetrics::new();
        metrics.record_enqueued();
        metrics.record_write_error();
        metrics.record_queue_full();

        metrics.reset();

        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.write_errors(), 0);
        assert_eq!(metrics.queue_full_events(), 0);
    }

    #[test]
    fn test_metrics_clone_is_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_enqueued();
        metrics.record_dispatched();

        let snapshot = metrics.clone();
        metrics.record_enqueued();

        assert_eq!(snapshot.enqueued(), 1);
        assert_eq!(metrics.enqueued(), 2);
    }
}
