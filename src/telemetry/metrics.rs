//! Metrics collection for mapper runs.

use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Runtime metrics collector
#[derive(Debug)]
pub struct Metrics {
    tasks_admitted: AtomicU64,
    tasks_completed: AtomicU64,
    tasks_failed: AtomicU64,
    tasks_panicked: AtomicU64,
    peak_in_flight: AtomicUsize,

    // Transform latency, guarded for interior mutability
    latency_histogram: Option<RwLock<Histogram<u64>>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        // 3 significant figures, max value of 1 hour in nanoseconds
        let histogram = Histogram::new_with_max(3_600_000_000_000, 3)
            .ok()
            .map(RwLock::new);

        Self {
            tasks_admitted: AtomicU64::new(0),
            tasks_completed: AtomicU64::new(0),
            tasks_failed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            peak_in_flight: AtomicUsize::new(0),
            latency_histogram: histogram,
            start_time: Instant::now(),
        }
    }

    /// Record a task entering the admission window
    pub fn record_admitted(&self, in_flight: usize) {
        self.tasks_admitted.fetch_add(1, Ordering::Relaxed);
        self.peak_in_flight.fetch_max(in_flight, Ordering::Relaxed);
    }

    /// Record a successful transform with its duration
    pub fn record_completed(&self, duration_ns: u64) {
        self.tasks_completed.fetch_add(1, Ordering::Relaxed);

        if let Some(hist) = &self.latency_histogram {
            if let Some(mut hist) = hist.try_write() {
                let _ = hist.record(duration_ns);
            }
        }
    }

    pub fn record_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panicked(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (avg, p50, p99, max) = match &self.latency_histogram {
            Some(hist) => {
                let hist = hist.read();
                let avg = if hist.len() > 0 { hist.mean() as u64 } else { 0 };
                (
                    avg,
                    hist.value_at_quantile(0.50),
                    hist.value_at_quantile(0.99),
                    hist.max(),
                )
            }
            None => (0, 0, 0, 0),
        };

        MetricsSnapshot {
            uptime: self.start_time.elapsed(),
            tasks_admitted: self.tasks_admitted.load(Ordering::Relaxed),
            tasks_completed: self.tasks_completed.load(Ordering::Relaxed),
            tasks_failed: self.tasks_failed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Relaxed),
            avg_latency_ns: avg,
            p50_latency_ns: p50,
            p99_latency_ns: p99,
            max_latency_ns: max,
        }
    }

    /// Reset all metrics
    pub fn reset(&self) {
        self.tasks_admitted.store(0, Ordering::Relaxed);
        self.tasks_completed.store(0, Ordering::Relaxed);
        self.tasks_failed.store(0, Ordering::Relaxed);
        self.tasks_panicked.store(0, Ordering::Relaxed);
        self.peak_in_flight.store(0, Ordering::Relaxed);

        if let Some(hist) = &self.latency_histogram {
            hist.write().reset();
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of the metrics
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    pub uptime: Duration,
    pub tasks_admitted: u64,
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub tasks_panicked: u64,
    pub peak_in_flight: usize,
    pub avg_latency_ns: u64,
    pub p50_latency_ns: u64,
    pub p99_latency_ns: u64,
    pub max_latency_ns: u64,
}

impl MetricsSnapshot {
    /// Fraction of settled tasks that failed
    pub fn failure_rate(&self) -> f64 {
        let settled = self.tasks_completed + self.tasks_failed;
        if settled == 0 {
            0.0
        } else {
            self.tasks_failed as f64 / settled as f64
        }
    }
}
