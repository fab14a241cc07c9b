//! Async stream support.

pub mod par_stream;

pub use futures::executor::block_on;
pub use par_stream::{try_map_concurrent, ParStreamExt};
