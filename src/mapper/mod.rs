//! Bounded-concurrency ordered mapping.
//!
//! [`BoundedMapper`] runs a transform over an input sequence on the worker
//! pool with at most `K` transforms in flight and returns the results in
//! input order. The free functions here use the global runtime.

pub mod admission;
pub mod bounded;

pub use admission::AdmissionWindow;
pub use bounded::{check_limit, BoundedMapper, Outcome};

use crate::error::{BoxError, Result};

/// Map `input` with at most `limit` transforms running at once.
pub fn map_concurrent<I, T, R, F>(input: I, limit: usize, transform: F) -> Result<Vec<R>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    BoundedMapper::new(limit)?.map(input, transform)
}

/// Fallible form of [`map_concurrent`]; fails fast on the first error.
pub fn try_map_concurrent<I, T, R, E, F>(input: I, limit: usize, transform: F) -> Result<Vec<R>>
where
    I: IntoIterator<Item = T>,
    T: Send + 'static,
    R: Send + 'static,
    E: Into<BoxError>,
    F: Fn(T) -> std::result::Result<R, E> + Send + Sync + 'static,
{
    BoundedMapper::new(limit)?.try_map(input, transform)
}
