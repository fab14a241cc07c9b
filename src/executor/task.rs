//! Jobs queued on the worker pool.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

static NEXT_SEQ: AtomicU64 = AtomicU64::new(0);

/// A boxed closure plus the bookkeeping workers log about it.
pub(crate) struct Job {
    seq: u64,
    enqueued_at: Instant,
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Job {
    pub(crate) fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            seq: NEXT_SEQ.fetch_add(1, Ordering::Relaxed),
            enqueued_at: Instant::now(),
            run: Box::new(f),
        }
    }

    /// Submission order across the process.
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn queued_for(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    pub(crate) fn run(self) {
        (self.run)()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job").field("seq", &self.seq).finish_non_exhaustive()
    }
}
