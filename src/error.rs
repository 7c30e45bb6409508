use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by fallible pipeline operations.
///
/// Filtering and mapping never fail; only grouping (duplicate inner keys) and engine construction
/// (invalid options, thread pool setup) produce errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Two items in the same outer group projected to the same inner key while the
    /// [`crate::processing::DuplicateKeyPolicy::Reject`] policy was in effect.
    #[error("duplicate key '{key}' in group '{group}'")]
    DuplicateKey { group: String, key: String },

    /// An option or argument is outside its valid range (e.g. `chunk_size == 0`).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The worker thread pool for parallel execution could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
