//! Fixed and sliding windows

use std::collections::VecDeque;
use std::iter::Fuse;

/// Consecutive, non-overlapping windows; the last may be short.
#[derive(Debug, Clone)]
pub struct WindowFixed<I> {
    pub(crate) iter: Fuse<I>,
    pub(crate) size: usize,
}

/// Overlapping windows of exactly `size`, advancing one element at a time.
///
/// Yields nothing when the input is shorter than `size`.
pub struct WindowSliding<I: Iterator> {
    pub(crate) iter: Fuse<I>,
    pub(crate) size: usize,
    pub(crate) buf: VecDeque<I::Item>,
}

impl<I: Iterator> WindowFixed<I> {
    pub(crate) fn new(iter: I, size: usize) -> Self {
        assert!(size > 0, "window size must be greater than 0");
        Self {
            iter: iter.fuse(),
            size,
        }
    }
}

impl<I: Iterator> WindowSliding<I> {
    pub(crate) fn new(iter: I, size: usize) -> Self {
        assert!(size > 0, "window size must be greater than 0");
        Self {
            iter: iter.fuse(),
            size,
            buf: VecDeque::with_capacity(size),
        }
    }
}

impl<I: Iterator> Iterator for WindowFixed<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<I::Item> = self.iter.by_ref().take(self.size).collect();
        if chunk.is_empty() {
            None
        } else {
            Some(chunk)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lo, hi) = self.iter.size_hint();
        let windows = |n: usize| (n + self.size - 1) / self.size;
        (windows(lo), hi.map(windows))
    }
}

impl<I> Iterator for WindowSliding<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.len() == self.size {
            self.buf.pop_front();
        }

        while self.buf.len() < self.size {
            let item = self.iter.next()?;
            self.buf.push_back(item);
        }

        Some(self.buf.iter().cloned().collect())
    }
}

impl<I> std::fmt::Debug for WindowSliding<I>
where
    I: Iterator + std::fmt::Debug,
    I::Item: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowSliding")
            .field("iter", &self.iter)
            .field("size", &self.size)
            .field("buf", &self.buf)
            .finish()
    }
}

/// Split a slice into windows of `size`; the final window may be shorter.
pub fn window_fixed<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "window size must be greater than 0");
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Every run of `size` consecutive elements; empty if `items.len() < size`.
pub fn window_sliding<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size > 0, "window size must be greater than 0");
    items.windows(size).map(<[T]>::to_vec).collect()
}
