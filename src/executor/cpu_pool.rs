use super::task::Job;
use super::worker::{Shared, Worker, WorkerStats};
use crate::config::Config;
use crate::error::{Error, Result};
use crossbeam_deque::Injector;
use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Fixed-size work-stealing thread pool.
pub struct CpuPool {
    threads: Vec<WorkerThread>,
    shared: Shared,
    queued: Arc<AtomicUsize>,
    next_wake: AtomicUsize,
}

struct WorkerThread {
    handle: Option<JoinHandle<()>>,
    stats: Arc<WorkerStats>,
}

impl CpuPool {
    pub fn new(config: &Config) -> Result<Self> {
        let num_threads = config.worker_threads();
        if num_threads == 0 {
            return Err(Error::config("need at least 1 thread"));
        }

        let workers: Vec<Worker> = (0..num_threads).map(Worker::new).collect();
        let shared = Shared {
            injector: Arc::new(Injector::new()),
            stealers: workers.iter().map(Worker::stealer).collect(),
            shutdown: Arc::new(AtomicBool::new(false)),
        };
        let queued = Arc::new(AtomicUsize::new(0));

        let mut threads = Vec::with_capacity(num_threads);
        for (index, worker) in workers.into_iter().enumerate() {
            let stats = worker.stats();
            let shared = shared.clone();

            let mut builder =
                thread::Builder::new().name(format!("{}-{}", config.thread_name_prefix, index));
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            let handle = builder
                .spawn(move || worker.run(shared))
                .map_err(|e| Error::executor(format!("spawn failed: {}", e)))?;

            threads.push(WorkerThread {
                handle: Some(handle),
                stats,
            });
        }

        debug!(
            "started pool with {} workers ({}-*)",
            num_threads, config.thread_name_prefix
        );

        Ok(Self {
            threads,
            shared,
            queued,
            next_wake: AtomicUsize::new(0),
        })
    }

    pub(crate) fn submit(&self, job: Job) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        self.shared.injector.push(job);
        self.wake_one();
    }

    /// Queue `f` to run on some worker.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let queued = self.queued.clone();
        self.submit(Job::new(move || {
            queued.fetch_sub(1, Ordering::Relaxed);
            f()
        }));
    }

    // idle workers park; nudge them round-robin so bursts spread out
    fn wake_one(&self) {
        let n = self.threads.len();
        let start = self.next_wake.fetch_add(1, Ordering::Relaxed) % n;
        if let Some(handle) = (0..n).find_map(|i| self.threads[(start + i) % n].handle.as_ref()) {
            handle.thread().unpark();
        }
    }

    /// Jobs submitted but not yet picked up.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn num_threads(&self) -> usize {
        self.threads.len()
    }

    /// Total jobs run across all workers.
    pub fn jobs_executed(&self) -> u64 {
        self.threads
            .iter()
            .map(|t| t.stats.executed.load(Ordering::Relaxed))
            .sum()
    }

    /// Jobs a worker took from a sibling's queue.
    pub fn jobs_stolen(&self) -> u64 {
        self.threads
            .iter()
            .map(|t| t.stats.stolen.load(Ordering::Relaxed))
            .sum()
    }

    pub fn shutdown(&mut self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }

        for handle in self.threads.iter().filter_map(|t| t.handle.as_ref()) {
            handle.thread().unpark();
        }
        for thread in &mut self.threads {
            if let Some(handle) = thread.handle.take() {
                let _ = handle.join();
            }
        }

        debug!("pool shut down ({} workers joined)", self.threads.len());
    }
}

impl Drop for CpuPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for CpuPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPool")
            .field("num_threads", &self.num_threads())
            .field("queued", &self.queued())
            .field("jobs_executed", &self.jobs_executed())
            .finish()
    }
}
