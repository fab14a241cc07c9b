//! Ordered map with a bound on concurrently running transforms.

use super::admission::AdmissionWindow;
use crate::error::{BoxError, Error, Result, TransformFailure};
use crate::executor::PanicInfo;
use crate::runtime::{self, Runtime};
use crossbeam_channel::{bounded, Sender};
use log::{debug, trace, warn};
use std::convert::Infallible;
use std::iter::{Enumerate, Peekable};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a mapping run reacts to a failing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ErrorPolicy {
    /// Stop admitting on the first failure and return it.
    #[default]
    FailFast,
    /// Run every element and report each outcome.
    Settle,
}

/// Outcome of a single element.
pub type Outcome<R> = std::result::Result<R, TransformFailure>;

/// Validate a concurrency limit.
pub fn check_limit(limit: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(limit).ok_or(Error::InvalidLimit(limit))
}

struct Completion<R> {
    index: usize,
    /// `None` when the run was cancelled before the job got to a worker.
    outcome: Option<Outcome<R>>,
    elapsed: Duration,
}

/// Applies a transform to every input element on the worker pool, with at
/// most `limit` transforms in flight, and returns results in input order.
///
/// Admission is in input order. Completion order is whatever the pool
/// produces; each result is stored at its element's index.
///
/// ```no_run
/// use gather_rs::BoundedMapper;
///
/// let mapper = BoundedMapper::new(3).unwrap();
/// let doubled = mapper.map(vec![1, 2, 3, 4], |x| x * 2).unwrap();
/// assert_eq!(doubled, vec![2, 4, 6, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct BoundedMapper {
    limit: NonZeroUsize,
    runtime: Option<Arc<Runtime>>,
}

impl BoundedMapper {
    /// Mapper on the global runtime. Fails with `InvalidLimit` for 0.
    pub fn new(limit: usize) -> Result<Self> {
        Ok(Self {
            limit: check_limit(limit)?,
            runtime: None,
        })
    }

    /// Mapper on `runtime` using its configured default limit.
    pub fn for_runtime(runtime: Arc<Runtime>) -> Result<Self> {
        let limit = check_limit(runtime.config().default_limit)?;
        Ok(Self {
            limit,
            runtime: Some(runtime),
        })
    }

    pub fn with_runtime(mut self, runtime: Arc<Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn map<I, T, R, F>(&self, input: I, transform: F) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + 'static,
    {
        self.try_map(input, move |item| Ok::<R, Infallible>(transform(item)))
    }

    /// Fail-fast mapping of a fallible transform.
    pub fn try_map<I, T, R, E, F>(&self, input: I, transform: F) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        E: Into<BoxError>,
        F: Fn(T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        self.run(input, transform, ErrorPolicy::FailFast)?
            .into_iter()
            .map(|outcome| outcome.map_err(Error::from))
            .collect()
    }

    /// Runs every element regardless of failures; `Err` only for limit or
    /// runtime problems.
    pub fn map_settled<I, T, R, E, F>(&self, input: I, transform: F) -> Result<Vec<Outcome<R>>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        E: Into<BoxError>,
        F: Fn(T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        self.run(input, transform, ErrorPolicy::Settle)
    }

    fn runtime(&self) -> Result<Arc<Runtime>> {
        match &self.runtime {
            Some(rt) => Ok(rt.clone()),
            None => runtime::current_or_init(),
        }
    }

    fn run<I, T, R, E, F>(
        &self,
        input: I,
        transform: F,
        policy: ErrorPolicy,
    ) -> Result<Vec<Outcome<R>>>
    where
        I: IntoIterator<Item = T>,
        T: Send + 'static,
        R: Send + 'static,
        E: Into<BoxError>,
        F: Fn(T) -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        let input: Vec<T> = input.into_iter().collect();
        let total = input.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let runtime = self.runtime()?;
        let transform = Arc::new(transform);
        // never more than `limit` completions outstanding, so sends don't block
        let (tx, rx) = bounded(self.limit.get());
        let mut window = AdmissionWindow::new(self.limit);
        let mut pending = input.into_iter().enumerate().peekable();
        let mut slots: Vec<Option<Outcome<R>>> =
            std::iter::repeat_with(|| None).take(total).collect();
        let mut first_failure: Option<TransformFailure> = None;
        // admitted jobs may still sit in the pool queue; they check this first
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut skipped = 0usize;

        debug!(
            "mapping {} elements, limit {}, {:?}",
            total, self.limit, policy
        );

        admit::<T, R, E, F>(&runtime, &mut window, &mut pending, &transform, &tx, &cancelled, policy);

        while window.in_flight() > 0 {
            let completion: Completion<R> = rx
                .recv()
                .map_err(|_| Error::executor("completion channel closed"))?;
            window.on_complete();

            let Some(outcome) = completion.outcome else {
                skipped += 1;
                continue;
            };
            record(&runtime, &outcome, completion.elapsed);

            match outcome {
                Err(failure) if policy == ErrorPolicy::FailFast => {
                    if first_failure.is_none() {
                        warn!(
                            "{}; not admitting {} remaining elements",
                            failure,
                            total - window.admitted()
                        );
                        window.close();
                        cancelled.store(true, Ordering::Release);
                        first_failure = Some(failure);
                    }
                }
                outcome => slots[completion.index] = Some(outcome),
            }

            admit::<T, R, E, F>(&runtime, &mut window, &mut pending, &transform, &tx, &cancelled, policy);
        }

        if let Some(failure) = first_failure {
            if skipped > 0 {
                debug!("{} queued elements skipped after failure", skipped);
            }
            return Err(failure.into());
        }

        debug!(
            "mapped {} elements, peak {} in flight",
            total,
            window.peak()
        );

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::executor("task finished without reporting a result"))
    }
}

fn admit<T, R, E, F>(
    runtime: &Runtime,
    window: &mut AdmissionWindow,
    pending: &mut Peekable<Enumerate<std::vec::IntoIter<T>>>,
    transform: &Arc<F>,
    tx: &Sender<Completion<R>>,
    cancelled: &Arc<AtomicBool>,
    policy: ErrorPolicy,
) where
    T: Send + 'static,
    R: Send + 'static,
    E: Into<BoxError>,
    F: Fn(T) -> std::result::Result<R, E> + Send + Sync + 'static,
{
    while pending.peek().is_some() && window.try_admit() {
        let Some((index, item)) = pending.next() else {
            break;
        };

        runtime.metrics.record_admitted(window.in_flight());
        trace!("admitted element {} ({} in flight)", index, window.in_flight());

        let transform = Arc::clone(transform);
        let handler = Arc::clone(&runtime.panic_handler);
        let tx = tx.clone();
        let cancelled = Arc::clone(cancelled);

        runtime.pool.execute(move || {
            if cancelled.load(Ordering::Acquire) {
                let _ = tx.send(Completion {
                    index,
                    outcome: None,
                    elapsed: Duration::ZERO,
                });
                return;
            }

            let start = Instant::now();
            let outcome = match handler.catch(index, || transform(item)) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(cause)) => Err(TransformFailure::new(index, cause)),
                Err(panic) => Err(TransformFailure::new(index, panic)),
            };
            // stop queued siblings before the collector even sees this
            if outcome.is_err() && policy == ErrorPolicy::FailFast {
                cancelled.store(true, Ordering::Release);
            }
            let _ = tx.send(Completion {
                index,
                outcome: Some(outcome),
                elapsed: start.elapsed(),
            });
        });
    }
}

fn record<R>(runtime: &Runtime, outcome: &Outcome<R>, elapsed: Duration) {
    match outcome {
        Ok(_) => runtime.metrics.record_completed(elapsed.as_nanos() as u64),
        Err(failure) => {
            if failure.cause.downcast_ref::<PanicInfo>().is_some() {
                runtime.metrics.record_panicked();
            }
            runtime.metrics.record_failed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::executor::PanicStrategy;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn runtime(threads: usize) -> Arc<Runtime> {
        let config = Config::builder()
            .num_threads(threads)
            .panic_strategy(PanicStrategy::Isolate)
            .build()
            .unwrap();
        Arc::new(Runtime::new(config).unwrap())
    }

    fn mapper(limit: usize, rt: &Arc<Runtime>) -> BoundedMapper {
        BoundedMapper::new(limit).unwrap().with_runtime(rt.clone())
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert!(matches!(BoundedMapper::new(0), Err(Error::InvalidLimit(0))));
        assert!(matches!(check_limit(0), Err(Error::InvalidLimit(0))));
    }

    #[test]
    fn test_empty_input_skips_pool() {
        let rt = runtime(2);
        let out: Vec<i32> = mapper(3, &rt).map(Vec::<i32>::new(), |x| x).unwrap();

        assert!(out.is_empty());
        #[cfg(feature = "telemetry")]
        assert_eq!(rt.metrics().tasks_admitted, 0);
    }

    #[test]
    fn test_preserves_input_order() {
        let rt = runtime(4);
        // later elements finish first
        let out = mapper(4, &rt)
            .map((0u64..12).collect::<Vec<_>>(), |x| {
                thread::sleep(Duration::from_millis(24 - 2 * x));
                x * 10
            })
            .unwrap();

        assert_eq!(out, (0u64..12).map(|x| x * 10).collect::<Vec<_>>());
    }

    #[test]
    fn test_never_exceeds_limit() {
        let rt = runtime(8);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (r, p) = (running.clone(), peak.clone());
        let out = mapper(3, &rt)
            .map(0..20, move |x: i32| {
                let now = r.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                r.fetch_sub(1, Ordering::SeqCst);
                x
            })
            .unwrap();

        assert_eq!(out, (0..20).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
        #[cfg(feature = "telemetry")]
        assert!(rt.metrics().peak_in_flight <= 3);
    }

    #[test]
    fn test_limit_one_runs_sequentially() {
        let rt = runtime(4);
        let order = Arc::new(Mutex::new(Vec::new()));

        let log = order.clone();
        mapper(1, &rt)
            .map(0..6, move |x: i32| {
                log.lock().push(x);
                thread::sleep(Duration::from_millis(2));
            })
            .unwrap();

        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_fail_fast_reports_index() {
        let rt = runtime(4);
        let started = Arc::new(Mutex::new(Vec::new()));

        let log = started.clone();
        let err = mapper(3, &rt)
            .try_map(0..10, move |x: usize| {
                log.lock().push(x);
                if x == 3 {
                    return Err(format!("profile {} unavailable", x));
                }
                thread::sleep(Duration::from_millis(20));
                Ok(x)
            })
            .unwrap_err();

        assert_eq!(err.failed_index(), Some(3));
        assert!(err.to_string().contains("profile 3 unavailable"));

        // admission stops once the failure is seen: at most one window past it
        let started = started.lock();
        assert!(started.iter().all(|&i| i <= 3 + 2), "started {:?}", started);
        assert!(started.len() < 10);
    }

    #[test]
    fn test_fail_fast_skips_queued_jobs() {
        // one worker, wide window: everything is queued before element 0 fails
        let rt = runtime(1);
        let started = Arc::new(Mutex::new(Vec::new()));

        let log = started.clone();
        let err = mapper(10, &rt)
            .try_map(0..10, move |x: usize| {
                log.lock().push(x);
                if x == 0 {
                    return Err("boom");
                }
                thread::sleep(Duration::from_millis(50));
                Ok(x)
            })
            .unwrap_err();

        assert_eq!(err.failed_index(), Some(0));
        assert_eq!(*started.lock(), vec![0]);

        // the pool is still usable afterwards
        assert_eq!(mapper(10, &rt).map(0..3, |x: i32| x + 1).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_settled_ignores_cancellation() {
        let rt = runtime(1);
        let ran = Arc::new(AtomicUsize::new(0));

        let count = ran.clone();
        let outcomes = mapper(8, &rt)
            .map_settled(0..8, move |x: i32| {
                count.fetch_add(1, Ordering::SeqCst);
                if x == 0 {
                    Err("first")
                } else {
                    Ok(x)
                }
            })
            .unwrap();

        assert_eq!(ran.load(Ordering::SeqCst), 8);
        assert!(outcomes[0].is_err());
        assert!(outcomes[1..].iter().all(|o| o.is_ok()));
    }

    #[test]
    fn test_panic_becomes_transform_failure() {
        let rt = runtime(2);
        let err = mapper(2, &rt)
            .map(0..4, |x: i32| {
                if x == 2 {
                    panic!("bad element");
                }
                x
            })
            .unwrap_err();

        assert_eq!(err.failed_index(), Some(2));
        assert!(err.to_string().contains("bad element"));
        assert_eq!(rt.panic_count(), 1);
        #[cfg(feature = "telemetry")]
        assert_eq!(rt.metrics().tasks_panicked, 1);
    }

    #[test]
    fn test_settled_runs_everything() {
        let rt = runtime(3);
        let outcomes = mapper(2, &rt)
            .map_settled(0..6, |x: i32| {
                if x % 3 == 0 {
                    Err("multiple of three")
                } else {
                    Ok(x * x)
                }
            })
            .unwrap();

        assert_eq!(outcomes.len(), 6);
        let failed: Vec<usize> = outcomes
            .iter()
            .filter_map(|o| o.as_ref().err().map(|f| f.index))
            .collect();
        assert_eq!(failed, vec![0, 3]);
        assert_eq!(outcomes[4].as_ref().ok(), Some(&16));
        #[cfg(feature = "telemetry")]
        assert_eq!(rt.metrics().tasks_failed, 2);
    }

    #[test]
    fn test_default_limit_from_config() {
        let config = Config::builder().num_threads(2).default_limit(2).build().unwrap();
        let rt = Arc::new(Runtime::new(config).unwrap());

        let mapper = BoundedMapper::for_runtime(rt).unwrap();
        assert_eq!(mapper.limit(), 2);
        assert_eq!(mapper.map(vec!["a", "b"], str::len).unwrap(), vec![1, 1]);
    }
}
