//! Shared helpers for pipeline scenario tests

#![allow(dead_code)]

use ppipeline::{Pipeline, ResultStream, Step};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Error raised by test steps
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TestError {
    #[error("Test error")]
    Failed,

    #[error("rejected {0}")]
    Rejected(i32),
}

pub fn add_1() -> Step<i32, TestError> {
    Step::map(|x| Ok(x + 1)).named("add_1")
}

pub fn mul_2() -> Step<i32, TestError> {
    Step::map(|x| Ok(x * 2)).named("mul_2")
}

/// Pipeline of `add_1` then `mul_2`
pub fn add_then_double() -> Pipeline<i32, TestError> {
    Pipeline::with_steps(vec![add_1(), mul_2()])
}

/// Drain a stream, panicking on the first step error, and sort the values
pub fn collect_sorted<T: Ord, E: std::fmt::Debug>(stream: ResultStream<T, E>) -> Vec<T> {
    let mut values: Vec<T> = stream
        .map(|r| r.expect("step should not fail"))
        .collect();
    values.sort();
    values
}

/// Tracks how many step invocations are in flight at once
#[derive(Debug, Default, Clone)]
pub struct ConcurrencyProbe {
    current: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl ConcurrencyProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A step that records concurrency and sleeps for `delay`
    pub fn step(&self, delay: Duration) -> Step<i32, TestError> {
        let probe = self.clone();
        Step::map(move |x| {
            let now = probe.current.fetch_add(1, Ordering::SeqCst) + 1;
            probe.peak.fetch_max(now, Ordering::SeqCst);
            probe.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(delay);
            probe.current.fetch_sub(1, Ordering::SeqCst);
            Ok(x)
        })
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A latch that steps can wait on
#[derive(Debug, Default, Clone)]
pub struct Gate {
    open: Arc<AtomicBool>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
    }

    pub fn wait(&self) {
        while !self.open.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
