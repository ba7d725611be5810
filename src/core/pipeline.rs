//! Pipeline domain model

use crate::{
    core::{
        config::EngineConfig,
        state::{PipelineStatus, RunGuard},
        step::Step,
    },
    error::{PipelineError, Result},
    execution::{engine, host_parallelism, ResultStream, ThreadCount},
};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An ordered sequence of steps plus the size of the pool that runs them
///
/// `T` is the item type flowing between steps and `E` the error type steps
/// may fail with.
pub struct Pipeline<T, E> {
    /// Steps in execution order
    steps: Vec<Step<T, E>>,

    /// Resolved worker count, always >= 1
    thread_count: usize,

    /// Set while a result stream from `run` is open
    running: Arc<AtomicBool>,
}

impl<T, E> Pipeline<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Empty pipeline with one worker per processing unit
    pub fn new() -> Self {
        Self::with_steps(Vec::new())
    }

    /// Pipeline with the given steps and one worker per processing unit
    pub fn with_steps(steps: Vec<Step<T, E>>) -> Self {
        Self {
            steps,
            thread_count: host_parallelism(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a pipeline sized from configuration
    pub fn from_config(config: &EngineConfig, steps: Vec<Step<T, E>>) -> Result<Self> {
        Self::with_steps(steps).with_thread_count(config.thread_count.unwrap_or_default())
    }

    pub fn builder() -> PipelineBuilder<T, E> {
        PipelineBuilder::new()
    }

    /// Resolve and set the worker count
    pub fn with_thread_count(mut self, thread_count: impl Into<ThreadCount>) -> Result<Self> {
        self.thread_count = thread_count.into().resolve()?;
        Ok(self)
    }

    /// Append a step. Affects runs started afterwards.
    pub fn add_step(&mut self, step: Step<T, E>) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Step<T, E>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolved number of workers
    pub fn thread_count(&self) -> usize {
        self.thread_count
    }

    pub fn status(&self) -> PipelineStatus {
        if self.running.load(Ordering::Acquire) {
            PipelineStatus::Running
        } else {
            PipelineStatus::Configured
        }
    }

    /// Run the pipeline on a single seed item
    pub fn run(&self, seed: T) -> Result<ResultStream<T, E>> {
        self.run_many(std::iter::once(seed))
    }

    /// Run the pipeline on every item of `seeds`
    ///
    /// Fails without scheduling any work if the pipeline has no steps or a
    /// stream from an earlier run is still open. Results are pulled lazily
    /// from the returned stream in completion order.
    pub fn run_many<I>(&self, seeds: I) -> Result<ResultStream<T, E>>
    where
        I: IntoIterator<Item = T>,
    {
        if self.steps.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }

        let guard = RunGuard::acquire(&self.running).ok_or(PipelineError::RunInProgress)?;
        let steps: Arc<[Step<T, E>]> = self.steps.iter().cloned().collect();

        engine::launch(steps, seeds.into_iter().collect(), self.thread_count, guard)
    }
}

impl<T, E> Default for Pipeline<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for Pipeline<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.steps)
            .field("thread_count", &self.thread_count)
            .field("running", &self.running.load(Ordering::Acquire))
            .finish()
    }
}

/// Incremental construction of a [`Pipeline`]
pub struct PipelineBuilder<T, E> {
    steps: Vec<Step<T, E>>,
    thread_count: ThreadCount,
}

impl<T, E> PipelineBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            thread_count: ThreadCount::Auto,
        }
    }

    pub fn step(mut self, step: Step<T, E>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step<T, E>>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn thread_count(mut self, thread_count: impl Into<ThreadCount>) -> Self {
        self.thread_count = thread_count.into();
        self
    }

    pub fn build(self) -> Result<Pipeline<T, E>> {
        Pipeline::with_steps(self.steps).with_thread_count(self.thread_count)
    }
}

impl<T, E> Default for PipelineBuilder<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
