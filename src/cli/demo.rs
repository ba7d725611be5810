//! Even/odd number pipeline run by `ppipeline demo`
//!
//! generate -> classify -> branch into even and odd processing -> drop
//! missing values. For seed `n` the results are the squares of the even
//! numbers below `n` and the odd numbers below `n` times three.

use crate::core::{Pipeline, Step, StepOutput};
use crate::error::Result;
use crate::execution::ThreadCount;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Even,
    Odd,
}

/// Item flowing through the demo pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Value {
    Number(i64),
    Classified { parity: Parity, value: i64 },
    /// Produced by a branch that does not apply to its input
    Missing,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemoError {
    #[error("step {step} received unexpected value {value:?}")]
    UnexpectedValue { step: &'static str, value: Value },

    #[error("seed must not be negative, got {0}")]
    NegativeSeed(i64),
}

fn expect_number(step: &'static str, value: Value) -> std::result::Result<i64, DemoError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(DemoError::UnexpectedValue { step, value: other }),
    }
}

fn generate_numbers(value: Value) -> std::result::Result<Vec<Value>, DemoError> {
    let n = expect_number("generate", value)?;
    if n < 0 {
        return Err(DemoError::NegativeSeed(n));
    }
    Ok((0..n).map(Value::Number).collect())
}

fn classify_number(value: Value) -> std::result::Result<Value, DemoError> {
    let n = expect_number("classify", value)?;
    let parity = if n % 2 == 0 { Parity::Even } else { Parity::Odd };
    Ok(Value::Classified { parity, value: n })
}

fn process_even(value: &Value) -> Value {
    match value {
        Value::Classified {
            parity: Parity::Even,
            value,
        } => Value::Number(value * value),
        _ => Value::Missing,
    }
}

fn process_odd(value: &Value) -> Value {
    match value {
        Value::Classified {
            parity: Parity::Odd,
            value,
        } => Value::Number(value * 3),
        _ => Value::Missing,
    }
}

fn branch(value: Value) -> std::result::Result<Vec<Value>, DemoError> {
    match value {
        Value::Classified { .. } => Ok(vec![process_even(&value), process_odd(&value)]),
        other => Err(DemoError::UnexpectedValue {
            step: "branch",
            value: other,
        }),
    }
}

fn combine_results(value: Value) -> std::result::Result<StepOutput<Value>, DemoError> {
    match value {
        Value::Missing => Ok(StepOutput::none()),
        other => Ok(StepOutput::Many(vec![other])),
    }
}

/// Steps of the demo pipeline, in order
pub fn number_steps() -> Vec<Step<Value, DemoError>> {
    vec![
        Step::flat_map(generate_numbers).named("generate_numbers"),
        Step::map(classify_number).named("classify_number"),
        Step::flat_map(branch).named("branch"),
        Step::new(combine_results).named("combine_results"),
    ]
}

pub fn number_pipeline(thread_count: ThreadCount) -> Result<Pipeline<Value, DemoError>> {
    Pipeline::with_steps(number_steps()).with_thread_count(thread_count)
}
