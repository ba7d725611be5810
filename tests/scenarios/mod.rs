//! Scenario-based tests for ppipeline

mod fan_out;
mod lifecycle;
