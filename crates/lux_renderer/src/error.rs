//! Render errors.

use lux_core::ImageError;
use thiserror::Error;

/// Errors that can occur while building a hierarchy or rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Requested {requested} worker threads, at most {limit} allowed on this machine")]
    ResourceLimitExceeded { requested: usize, limit: usize },

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
