//! ppipeline - parallel data processing through a sequence of steps

pub mod cli;
pub mod core;
pub mod error;
pub mod execution;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, Pipeline, PipelineBuilder, PipelineStatus, RunStats, Step, StepOutput,
};
pub use crate::error::PipelineError;
pub use crate::execution::{ResultStream, ThreadCount};
