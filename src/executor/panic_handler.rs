use log::{error, warn};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What to do when a transform panics on a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Abort the process.
    Abort,
    /// Report the panic as the element's failure without logging it.
    Isolate,
    /// Like `Isolate`, with a `warn!` line per panic.
    #[default]
    LogAndContinue,
}

/// Turns transform panics into [`PanicInfo`] failures and counts them.
#[derive(Debug, Default)]
pub struct PanicHandler {
    strategy: PanicStrategy,
    caught: AtomicUsize,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            caught: AtomicUsize::new(0),
        }
    }

    /// Run the transform for element `index`, catching a panic.
    pub fn catch<F, R>(&self, index: usize, f: F) -> Result<R, PanicInfo>
    where
        F: FnOnce() -> R,
    {
        catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            let info = PanicInfo::from(payload);
            self.caught.fetch_add(1, Ordering::Relaxed);
            self.report(index, &info);
            info
        })
    }

    fn report(&self, index: usize, info: &PanicInfo) {
        match self.strategy {
            PanicStrategy::Abort => {
                error!("transform panicked on element {}: {}; aborting", index, info.message);
                std::process::abort();
            }
            PanicStrategy::Isolate => {}
            PanicStrategy::LogAndContinue => {
                warn!("transform panicked on element {}: {}", index, info.message)
            }
        }
    }

    pub fn panic_count(&self) -> usize {
        self.caught.load(Ordering::Relaxed)
    }

    pub fn strategy(&self) -> PanicStrategy {
        self.strategy
    }
}

/// Message of a caught panic; usable as a transform failure cause.
#[derive(Debug, Clone, thiserror::Error)]
#[error("transform panicked: {message}")]
pub struct PanicInfo {
    pub message: String,
}

impl From<Box<dyn Any + Send>> for PanicInfo {
    fn from(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map_or_else(|| "non-string panic payload".to_string(), |s| s.to_string()),
        };
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_panic_becomes_info() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);

        let info = handler.catch(0, || panic!("test panic")).unwrap_err();

        assert_eq!(info.message, "test panic");
        assert_eq!(info.to_string(), "transform panicked: test panic");
        assert_eq!(handler.panic_count(), 1);
    }

    #[test]
    fn test_value_passes_through() {
        let handler = PanicHandler::default();

        assert_eq!(handler.catch(0, || 42).unwrap(), 42);
        assert_eq!(handler.panic_count(), 0);
        assert_eq!(handler.strategy(), PanicStrategy::LogAndContinue);
    }

    #[test]
    fn test_formatted_panic_message() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);
        let id = 7;

        let info = handler
            .catch(id, || -> i32 { panic!("profile {} missing", id) })
            .unwrap_err();
        assert_eq!(info.message, "profile 7 missing");
    }

    #[test]
    fn test_non_string_payload() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);

        let info = handler
            .catch(0, || std::panic::panic_any(17u8))
            .unwrap_err();
        assert_eq!(info.message, "non-string panic payload");
    }

    #[test]
    fn test_counts_every_panic() {
        let handler = PanicHandler::new(PanicStrategy::LogAndContinue);

        for i in 0..5 {
            let _ = handler.catch(i, || panic!("test"));
        }

        assert_eq!(handler.panic_count(), 5);
    }
}
