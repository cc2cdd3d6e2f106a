//! Logger metrics for observability
//!
//! Counters for monitoring logger health: how many records were written,
//! filtered out, partially delivered or dropped because their fields could
//! not be marshalled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use fanout_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_written();
/// metrics.record_sink_failure();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.sink_failure_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Records rendered and handed to the sinks
    written: AtomicU64,

    /// Calls dropped by the level filter
    filtered: AtomicU64,

    /// Records at least one sink failed to accept
    sink_failures: AtomicU64,

    /// Structured records dropped because their fields could not be rendered
    marshal_failures: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            written: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            marshal_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failure_count(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn marshal_failure_count(&self) -> u64 {
        self.marshal_failures.load(Ordering::Relaxed)
    }

    /// Record a dispatched record; returns the previous count
    #[inline]
    pub fn record_written(&self) -> u64 {
        self.written.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sink_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_marshal_failure(&self) -> u64 {
        self.marshal_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of dispatched records with at least one failed sink (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been written.
    pub fn failure_rate(&self) -> f64 {
        let written = self.written_count() as f64;
        if written == 0.0 {
            0.0
        } else {
            (self.sink_failure_count() as f64 / written) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.written.store(0, Ordering::Relaxed);
        self.filtered.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.marshal_failures.store(0, Ordering::Relaxed);
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
            written: AtomicU64::new(self.written_count()),
            filtered: AtomicU64::new(self.filtered_count()),
            sink_failures: AtomicU64::new(self.sink_failure_count()),
            marshal_failures: AtomicU64::new(self.marshal_failure_count()),
        }
    }
}
