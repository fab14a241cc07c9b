//! Sequence gatherers.
//!
//! Free functions over slices and iterators, plus [`GatherExt`] so the same
//! operations chain onto ordinary iterator pipelines:
//!
//! ```
//! use gather_rs::iter::GatherExt;
//!
//! let batches: Vec<Vec<i32>> = (101..=107).window_fixed(3).collect();
//! assert_eq!(batches, vec![vec![101, 102, 103], vec![104, 105, 106], vec![107]]);
//!
//! let balances: Vec<i32> = [1000, -200, -500].into_iter().scan_with(0, |a, x| a + x).collect();
//! assert_eq!(balances, vec![1000, 800, 300]);
//! ```

pub mod accumulate;
pub mod matching;
pub mod window;

pub use accumulate::{fold, scan, ScanWith};
pub use matching::{all_match, any_match, none_match};
pub use window::{window_fixed, window_sliding, WindowFixed, WindowSliding};

use crate::error::Result;

/// Gatherer adaptors for every iterator.
pub trait GatherExt: Iterator + Sized {
    /// Non-overlapping batches of `size`; the last batch may be short.
    ///
    /// Panics if `size` is 0.
    fn window_fixed(self, size: usize) -> WindowFixed<Self> {
        WindowFixed::new(self, size)
    }

    /// Overlapping windows of exactly `size`; nothing if the input is
    /// shorter than `size`.
    ///
    /// Panics if `size` is 0.
    fn window_sliding(self, size: usize) -> WindowSliding<Self>
    where
        Self::Item: Clone,
    {
        WindowSliding::new(self, size)
    }

    /// Running accumulation, yielding each intermediate value.
    fn scan_with<A, F>(self, seed: A, combine: F) -> ScanWith<Self, A, F>
    where
        A: Clone,
        F: FnMut(A, Self::Item) -> A,
    {
        ScanWith::new(self, seed, combine)
    }

    fn fold_with<A, F>(self, seed: A, combine: F) -> A
    where
        F: FnMut(A, Self::Item) -> A,
    {
        fold(self, seed, combine)
    }

    fn none_match<P>(self, predicate: P) -> bool
    where
        P: FnMut(&Self::Item) -> bool,
    {
        none_match(self, predicate)
    }

    /// Map on the global runtime with at most `limit` transforms in flight,
    /// keeping input order.
    fn map_concurrent<R, F>(self, limit: usize, transform: F) -> Result<Vec<R>>
    where
        Self::Item: Send + 'static,
        R: Send + 'static,
        F: Fn(Self::Item) -> R + Send + Sync + 'static,
    {
        crate::mapper::map_concurrent(self, limit, transform)
    }
}

impl<I: Iterator> GatherExt for I {}
