//! gather-rs: sequence gatherers and bounded-concurrency ordered mapping.
//!
//! # Quick Start
//!
//! ```no_run
//! use gather_rs::prelude::*;
//!
//! // At most 3 fetches in flight; results come back in input order.
//! let profiles = map_concurrent(1..=10, 3, |id: u32| format!("profile {}", id)).unwrap();
//! assert_eq!(profiles[0], "profile 1");
//!
//! // Sequential gatherers
//! let batches = window_fixed(&[101, 102, 103, 104, 105, 106, 107], 3);
//! let balances = scan([1000, -200, -500, 200, -300], 0, |a, x| a + x);
//! assert_eq!(batches.len(), 3);
//! assert_eq!(balances, vec![1000, 800, 300, 500, 200]);
//! ```
//!
//! # Features
//!
//! - **Bounded mapping**: sliding-window admission over a work-stealing pool
//! - **Fail-fast or settled** error handling for fallible transforms
//! - **Gatherers**: fold, scan, fixed and sliding windows, predicate matching
//! - **Async streams**: ordered bounded mapping over `futures` streams (`async`)
//! - **Telemetry**: admission counters and latency histogram (`telemetry`)

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod iter;
pub mod mapper;
pub mod prelude;
pub mod runtime;
pub mod telemetry;

#[cfg(feature = "async")]
pub mod async_bridge;

// Re-export key types at crate root
pub use config::{Config, ConfigBuilder};
pub use error::{BoxError, Error, Result, TransformFailure};
pub use iter::GatherExt;
pub use mapper::{map_concurrent, try_map_concurrent, BoundedMapper};
pub use runtime::{init, init_with_config, shutdown, Runtime};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_concurrent_on_global_runtime() {
        let out = map_concurrent(vec![3, 1, 2], 2, |x: i32| x * x).unwrap();
        assert_eq!(out, vec![9, 1, 4]);
    }

    #[test]
    fn test_try_map_concurrent_reports_limit() {
        let err = try_map_concurrent(vec![1], 0, |x: i32| Ok::<_, Error>(x)).unwrap_err();
        assert!(matches!(err, Error::InvalidLimit(0)));
    }

    #[test]
    fn test_gatherers_compose() {
        let orders: Vec<i32> = (101..=107).collect();
        let batch_totals: Vec<i32> = orders
            .into_iter()
            .window_fixed(3)
            .map(|batch| batch.iter().sum())
            .collect();

        assert_eq!(batch_totals, vec![306, 315, 107]);
        assert_eq!(iter::scan(batch_totals, 0, |a, x| a + x), vec![306, 621, 728]);
    }
}
