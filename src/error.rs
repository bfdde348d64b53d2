use thiserror::Error;

/// Errors that can occur while tracing or emitting vector output.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TraceError {
    #[error("failed to load image: {0}")]
    ImageLoad(String),

    #[error("invalid bitmap: width and height must be nonzero")]
    InvalidBitmap,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("trace failure: {0}")]
    TraceFailure(String),

    #[error("path list is empty")]
    EmptyPathList,
}
