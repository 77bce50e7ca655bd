use std::time::Duration;

use thiserror::Error;

/// Errors raised while producing or transforming a single frame.
///
/// These never escape the scheduler's tick loop; they are handed to the
/// error reporter and the tick is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("capture target unavailable: {0}")]
    Unavailable(String),

    #[error("capture timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("frame has zero area ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("transform worker failed: {0}")]
    Worker(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CaptureError>;
