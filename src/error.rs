//! Error types shared by the runtime, the executor and the mapper.

/// Boxed cause carried by a failed transform.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transform failed for element {index}: {cause}")]
    TransformFailure {
        index: usize,
        #[source]
        cause: BoxError,
    },

    #[error("concurrency limit must be at least 1 (got {0})")]
    InvalidLimit(usize),

    #[error("executor error: {0}")]
    Executor(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("runtime not initialized")]
    NotInitialized,

    #[error("already initialized")]
    AlreadyInitialized,
}

impl Error {
    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Index of the failing element, if this is a transform failure.
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            Error::TransformFailure { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A single element's failure, as reported by settled mapping.
#[derive(Debug, thiserror::Error)]
#[error("transform failed for element {index}: {cause}")]
pub struct TransformFailure {
    pub index: usize,
    #[source]
    pub cause: BoxError,
}

impl TransformFailure {
    pub fn new<E: Into<BoxError>>(index: usize, cause: E) -> Self {
        Self {
            index,
            cause: cause.into(),
        }
    }
}

impl From<TransformFailure> for Error {
    fn from(failure: TransformFailure) -> Self {
        Error::TransformFailure {
            index: failure.index,
            cause: failure.cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_failure_converts_with_index() {
        let failure = TransformFailure::new(3, "boom");
        let err: Error = failure.into();

        assert_eq!(err.failed_index(), Some(3));
        assert_eq!(err.to_string(), "transform failed for element 3: boom");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_non_transform_errors_have_no_index() {
        assert_eq!(Error::InvalidLimit(0).failed_index(), None);
        assert_eq!(Error::config("bad").to_string(), "config error: bad");
    }
}
