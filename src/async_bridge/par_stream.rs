//! Ordered, bounded mapping over async streams.

use crate::error::{BoxError, Error, Result, TransformFailure};
use crate::mapper::check_limit;
use futures::stream::{Buffered, Map};
use futures::{Future, Stream, StreamExt, TryStreamExt};

/// Extension trait for bounded concurrent stream mapping
pub trait ParStreamExt: Stream + Sized {
    /// Run `f` over the stream with at most `limit` futures in flight,
    /// yielding outputs in input order.
    fn map_concurrent<F, Fut>(self, limit: usize, f: F) -> Result<Buffered<Map<Self, F>>>
    where
        F: FnMut(Self::Item) -> Fut,
        Fut: Future,
    {
        let limit = check_limit(limit)?;
        Ok(self.map(f).buffered(limit.get()))
    }
}

impl<S: Stream> ParStreamExt for S {}

/// Collect a fallible bounded map, stopping at the first failure.
///
/// Futures still in flight when a failure surfaces are dropped with the
/// stream, which cancels them at their next await point.
pub async fn try_map_concurrent<S, F, Fut, R, E>(stream: S, limit: usize, mut f: F) -> Result<Vec<R>>
where
    S: Stream,
    F: FnMut(S::Item) -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
    E: Into<BoxError>,
{
    let limit = check_limit(limit)?;

    stream
        .enumerate()
        .map(move |(index, item)| {
            let fut = f(item);
            async move { fut.await.map_err(|e| TransformFailure::new(index, e)) }
        })
        .buffered(limit.get())
        .try_collect::<Vec<R>>()
        .await
        .map_err(Error::from)
}
