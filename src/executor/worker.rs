// worker thread loop
use super::task::Job;
use crossbeam_deque::{Injector, Steal, Stealer, Worker as LocalQueue};
use log::{trace, warn};
use rand::Rng;
use std::iter;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Counters a worker publishes to its pool.
#[derive(Debug, Default)]
pub(crate) struct WorkerStats {
    pub(crate) executed: AtomicU64,
    pub(crate) stolen: AtomicU64,
}

/// What every worker shares with the pool.
#[derive(Clone)]
pub(crate) struct Shared {
    pub(crate) injector: Arc<Injector<Job>>,
    pub(crate) stealers: Arc<[Stealer<Job>]>,
    pub(crate) shutdown: Arc<AtomicBool>,
}

pub(crate) struct Worker {
    index: usize,
    queue: LocalQueue<Job>,
    stats: Arc<WorkerStats>,
}

impl Worker {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            queue: LocalQueue::new_fifo(),
            stats: Arc::default(),
        }
    }

    pub(crate) fn stealer(&self) -> Stealer<Job> {
        self.queue.stealer()
    }

    pub(crate) fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    pub(crate) fn run(self, shared: Shared) {
        let mut idle = Idle::default();

        while !shared.shutdown.load(Ordering::Acquire) {
            match self.next_job(&shared) {
                Some(job) => {
                    idle.reset();
                    self.run_job(job);
                }
                None => idle.snooze(),
            }
        }
    }

    // own queue, then the injector, then a random sibling
    fn next_job(&self, shared: &Shared) -> Option<Job> {
        self.queue.pop().or_else(|| {
            retry(|| shared.injector.steal_batch_and_pop(&self.queue))
                .or_else(|| self.steal(&shared.stealers))
        })
    }

    fn steal(&self, stealers: &[Stealer<Job>]) -> Option<Job> {
        let n = stealers.len();
        if n < 2 {
            return None;
        }

        let start = rand::thread_rng().gen_range(0..n);
        let job = (0..n)
            .map(|offset| (start + offset) % n)
            .filter(|&victim| victim != self.index)
            .find_map(|victim| retry(|| stealers[victim].steal_batch_and_pop(&self.queue)))?;

        self.stats.stolen.fetch_add(1, Ordering::Relaxed);
        Some(job)
    }

    fn run_job(&self, job: Job) {
        let seq = job.seq();
        trace!(
            "worker {} running job {} (queued {:?})",
            self.index,
            seq,
            job.queued_for()
        );

        // mapper jobs catch their own panics; this only keeps the thread alive
        if catch_unwind(AssertUnwindSafe(|| job.run())).is_err() {
            warn!("job {} panicked on worker {}", seq, self.index);
        }

        self.stats.executed.fetch_add(1, Ordering::Relaxed);
    }
}

fn retry<T>(mut attempt: impl FnMut() -> Steal<T>) -> Option<T> {
    iter::repeat_with(&mut attempt)
        .find(|s| !s.is_retry())
        .and_then(Steal::success)
}

/// Spin, then yield, then park briefly while no work shows up.
#[derive(Debug, Default)]
struct Idle {
    rounds: u32,
}

impl Idle {
    const SPIN_ROUNDS: u32 = 10;
    const YIELD_ROUNDS: u32 = 20;

    fn reset(&mut self) {
        self.rounds = 0;
    }

    fn snooze(&mut self) {
        self.rounds = self.rounds.saturating_add(1);

        if self.rounds <= Self::SPIN_ROUNDS {
            for _ in 0..(1u32 << self.rounds.min(6)) {
                std::hint::spin_loop();
            }
        } else if self.rounds <= Self::YIELD_ROUNDS {
            thread::yield_now();
        } else {
            thread::park_timeout(Duration::from_micros(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_stops_on_empty() {
        let mut calls = 0;
        let got: Option<u8> = retry(|| {
            calls += 1;
            if calls < 3 {
                Steal::Retry
            } else {
                Steal::Empty
            }
        });
        assert!(got.is_none());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_next_job_prefers_local_then_injector() {
        let worker = Worker::new(0);
        let shared = Shared {
            injector: Arc::new(Injector::new()),
            stealers: vec![worker.stealer()].into(),
            shutdown: Arc::new(AtomicBool::new(false)),
        };

        let injected = Job::new(|| {});
        let local = Job::new(|| {});
        let (injected_seq, local_seq) = (injected.seq(), local.seq());
        shared.injector.push(injected);
        worker.queue.push(local);

        assert_eq!(worker.next_job(&shared).map(|j| j.seq()), Some(local_seq));
        assert_eq!(worker.next_job(&shared).map(|j| j.seq()), Some(injected_seq));
        assert!(worker.next_job(&shared).is_none());
    }
}
