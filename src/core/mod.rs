//! Core domain models for Pipeline
//!
//! This module defines the pipeline, its steps, run state and the engine
//! configuration.

pub mod config;
pub mod pipeline;
pub mod state;
pub mod step;

pub use config::EngineConfig;
pub use pipeline::*;
pub use state::{PipelineStatus, RunStats};
pub use step::*;
