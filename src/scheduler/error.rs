use thiserror::Error;

/// Errors returned synchronously by scheduler commands.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerError {
    #[error("frame rate must be above 0 and at most 60, got {0}")]
    InvalidRate(f64),

    #[error("capture target rejected: {0}")]
    InvalidTarget(String),

    #[error("no tokio runtime available to drive the capture loop")]
    NoRuntime,
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SchedulerError>;
