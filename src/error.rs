//! Engine error types

use thiserror::Error;

/// Errors raised by the engine itself.
///
/// Failures raised by step functions are never converted into this type;
/// they reach the consumer of a [`ResultStream`](crate::ResultStream) as-is.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// `run` was called on a pipeline with no registered steps
    #[error("Cannot run pipeline without steps")]
    EmptyPipeline,

    /// Thread count could not be parsed or resolved to a positive value
    #[error("{0}")]
    InvalidThreadCount(String),

    /// A result stream from an earlier `run` is still open
    #[error("Pipeline is already running; drop the previous result stream first")]
    RunInProgress,

    /// The worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    Runtime(#[from] std::io::Error),

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
