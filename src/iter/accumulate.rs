//! Sequential reductions: fold and scan.

/// Running accumulation that yields every intermediate value.
#[derive(Debug, Clone)]
pub struct ScanWith<I, A, F> {
    pub(crate) iter: I,
    pub(crate) acc: Option<A>,
    pub(crate) combine: F,
}

impl<I, A, F> ScanWith<I, A, F> {
    pub(crate) fn new(iter: I, seed: A, combine: F) -> Self {
        Self {
            iter,
            acc: Some(seed),
            combine,
        }
    }
}

impl<I, A, F> Iterator for ScanWith<I, A, F>
where
    I: Iterator,
    A: Clone,
    F: FnMut(A, I::Item) -> A,
{
    type Item = A;

    fn next(&mut self) -> Option<A> {
        let item = self.iter.next()?;
        let acc = self.acc.take()?;
        let next = (self.combine)(acc, item);
        self.acc = Some(next.clone());
        Some(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Left fold: `combine(..combine(seed, x0).., xn-1)`.
pub fn fold<I, A, F>(items: I, seed: A, combine: F) -> A
where
    I: IntoIterator,
    F: FnMut(A, I::Item) -> A,
{
    items.into_iter().fold(seed, combine)
}

/// Every intermediate accumulator, one per input element. The seed itself
/// is not emitted.
pub fn scan<I, A, F>(items: I, seed: A, combine: F) -> Vec<A>
where
    I: IntoIterator,
    A: Clone,
    F: FnMut(A, I::Item) -> A,
{
    ScanWith::new(items.into_iter(), seed, combine).collect()
}
