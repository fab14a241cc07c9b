pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result, TransformFailure};
pub use crate::executor::PanicStrategy;
pub use crate::iter::{
    all_match, any_match, fold, none_match, scan, window_fixed, window_sliding, GatherExt,
};
pub use crate::mapper::{map_concurrent, try_map_concurrent, BoundedMapper};
pub use crate::runtime::Runtime;
pub use crate::{init, init_with_config, shutdown};

#[cfg(feature = "telemetry")]
pub use crate::telemetry::MetricsSnapshot;

#[cfg(feature = "async")]
pub use crate::async_bridge::{block_on, try_map_concurrent as try_map_stream, ParStreamExt};
