use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::{CpuPool, PanicHandler};
use crate::telemetry::{Metrics, MetricsSnapshot};
use log::debug;
use parking_lot::RwLock;
use std::sync::Arc;

/// Worker pool plus the configuration it was built from.
///
/// Mappers hold an `Arc<Runtime>` for the duration of a call, so dropping
/// the last handle (or calling [`shutdown`]) never strands in-flight work.
#[derive(Debug)]
pub struct Runtime {
    pub(crate) pool: CpuPool,
    pub(crate) panic_handler: Arc<PanicHandler>,
    pub(crate) metrics: Metrics,
    config: Config,
}

impl Runtime {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = CpuPool::new(&config)?;

        Ok(Self {
            pool,
            panic_handler: Arc::new(PanicHandler::new(config.panic_strategy)),
            metrics: Metrics::new(),
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn num_threads(&self) -> usize {
        self.pool.num_threads()
    }

    /// Panics caught from transforms since the runtime started.
    pub fn panic_count(&self) -> usize {
        self.panic_handler.panic_count()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

// Global runtime for the simple API
static GLOBAL_RUNTIME: RwLock<Option<Arc<Runtime>>> = RwLock::new(None);

pub fn init() -> Result<()> {
    init_with_config(Config::default())
}

pub fn init_with_config(config: Config) -> Result<()> {
    let mut runtime = GLOBAL_RUNTIME.write();

    if runtime.is_some() {
        return Err(Error::AlreadyInitialized);
    }

    let rt = Runtime::new(config)?;
    debug!("global runtime initialized with {} workers", rt.num_threads());
    *runtime = Some(Arc::new(rt));

    Ok(())
}

/// Handle to the global runtime.
pub fn current() -> Result<Arc<Runtime>> {
    GLOBAL_RUNTIME.read().clone().ok_or(Error::NotInitialized)
}

/// Handle to the global runtime, starting one with the default config if
/// none is running.
pub fn current_or_init() -> Result<Arc<Runtime>> {
    if let Some(rt) = GLOBAL_RUNTIME.read().as_ref() {
        return Ok(rt.clone());
    }

    let mut runtime = GLOBAL_RUNTIME.write();
    // another thread may have won the race
    if let Some(rt) = runtime.as_ref() {
        return Ok(rt.clone());
    }

    let rt = Arc::new(Runtime::new(Config::default())?);
    debug!("global runtime started lazily with {} workers", rt.num_threads());
    *runtime = Some(rt.clone());
    Ok(rt)
}

pub fn is_initialized() -> bool {
    GLOBAL_RUNTIME.read().is_some()
}

/// Drop the global handle. Workers stop once every outstanding handle is gone.
pub fn shutdown() {
    let previous = GLOBAL_RUNTIME.write().take();
    if previous.is_some() {
        debug!("global runtime released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_runtime_uses_config() {
        let config = Config::builder().num_threads(2).build().unwrap();
        let rt = Runtime::new(config).unwrap();

        assert_eq!(rt.num_threads(), 2);
        assert_eq!(rt.config().thread_name_prefix, "gather-worker");
        assert_eq!(rt.panic_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = Config {
            num_threads: Some(0),
            ..Config::default()
        };
        assert!(matches!(Runtime::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_current_or_init_is_shared() {
        let a = current_or_init().unwrap();
        let b = current_or_init().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(is_initialized());
        assert!(matches!(init(), Err(Error::AlreadyInitialized)));
    }
}
