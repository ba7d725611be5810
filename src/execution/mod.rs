//! Pipeline execution engine

pub mod engine;
pub mod threads;

pub use engine::ResultStream;
pub use threads::{host_parallelism, ThreadCount};
