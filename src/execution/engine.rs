//! Run execution - worker pool, fan-out and the result stream
//!
//! Every run gets its own multi-threaded runtime sized to the pipeline's
//! thread count. Each lineage is a task: it applies the steps in order,
//! spawns a new task for every extra branch of a fan-out and keeps the first
//! branch for itself. Final outputs, step errors and step panics are sent to
//! the [`ResultStream`] as [`Envelope`]s. The channel closes once the last
//! task has dropped its sender, which ends the stream.

use crate::{
    core::{
        state::{RunCounters, RunGuard},
        RunStats, Step,
    },
    error::Result,
};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Message sent from a worker to the result stream
enum Envelope<T, E> {
    /// A value that passed through every step
    Output(T),
    /// A step returned an error
    Failed(E),
    /// A step panicked
    Panicked(Box<dyn Any + Send + 'static>),
}

/// State shared by every task of one run
struct RunContext<T, E> {
    run_id: Uuid,
    steps: Arc<[Step<T, E>]>,
    sender: UnboundedSender<Envelope<T, E>>,
    counters: Arc<RunCounters>,
    handle: Handle,
}

impl<T, E> Clone for RunContext<T, E> {
    fn clone(&self) -> Self {
        Self {
            run_id: self.run_id,
            steps: Arc::clone(&self.steps),
            sender: self.sender.clone(),
            counters: Arc::clone(&self.counters),
            handle: self.handle.clone(),
        }
    }
}

impl<T, E> RunContext<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Start a new lineage at `index` on the pool
    fn spawn(&self, item: T, index: usize) {
        let ctx = self.clone();
        self.handle.spawn(async move { ctx.run_lineage(item, index) });
    }

    fn step_label(&self, index: usize) -> String {
        match self.steps[index].name() {
            Some(name) => format!("{} (#{})", name, index),
            None => format!("#{}", index),
        }
    }

    fn deliver(&self, envelope: Envelope<T, E>) {
        // The receiver is gone only when the stream was dropped
        if self.sender.send(envelope).is_err() {
            debug!("Run {}: result stream closed, discarding result", self.run_id);
        }
    }

    fn run_lineage(self, mut item: T, mut index: usize) {
        loop {
            if self.sender.is_closed() {
                debug!("Run {}: result stream closed, abandoning lineage", self.run_id);
                return;
            }

            let step = &self.steps[index];
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| step.apply(item)));
            self.counters.step_invoked();

            let output = match outcome {
                Ok(Ok(output)) => output,
                Ok(Err(error)) => {
                    self.counters.failed();
                    warn!("Run {}: step {} failed", self.run_id, self.step_label(index));
                    self.deliver(Envelope::Failed(error));
                    return;
                }
                Err(payload) => {
                    self.counters.panicked();
                    warn!("Run {}: step {} panicked", self.run_id, self.step_label(index));
                    self.deliver(Envelope::Panicked(payload));
                    return;
                }
            };

            if output.is_fan_out() {
                self.counters.fanned_out();
                debug!(
                    "Run {}: step {} fanned out into {} items",
                    self.run_id,
                    self.step_label(index),
                    output.len()
                );
            }

            let mut branches = output.into_items().into_iter();
            let Some(first) = branches.next() else {
                self.counters.lineage_dropped();
                debug!(
                    "Run {}: lineage dropped at step {}",
                    self.run_id,
                    self.step_label(index)
                );
                return;
            };

            let next = index + 1;
            if next == self.steps.len() {
                for value in std::iter::once(first).chain(branches) {
                    self.counters.output();
                    self.deliver(Envelope::Output(value));
                }
                return;
            }

            for branch in branches {
                self.spawn(branch, next);
            }

            item = first;
            index = next;
        }
    }
}

/// Start a run: build the pool, submit every seed and hand back the stream
pub(crate) fn launch<T, E>(
    steps: Arc<[Step<T, E>]>,
    seeds: Vec<T>,
    thread_count: usize,
    guard: RunGuard,
) -> Result<ResultStream<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let runtime = Builder::new_multi_thread()
        .worker_threads(thread_count)
        .thread_name("ppipeline-worker")
        .build()?;

    let run_id = Uuid::new_v4();
    let counters = Arc::new(RunCounters::default());
    let (sender, receiver) = mpsc::unbounded_channel();

    info!(
        "Starting run {}: {} seed(s), {} step(s), {} worker(s)",
        run_id,
        seeds.len(),
        steps.len(),
        thread_count
    );

    counters.add_seeds(seeds.len() as u64);

    let ctx = RunContext {
        run_id,
        steps,
        sender,
        counters: Arc::clone(&counters),
        handle: runtime.handle().clone(),
    };

    for seed in seeds {
        ctx.spawn(seed, 0);
    }
    // Tasks hold the remaining senders
    drop(ctx);

    Ok(ResultStream {
        run_id,
        receiver,
        runtime: Some(runtime),
        counters,
        guard: Some(guard),
    })
}

/// Lazy, single-pass sequence of a run's final outputs
///
/// Items arrive in completion order. A step error is yielded as `Err` in the
/// position of the item that failed; other lineages keep running. A step
/// panic is resumed on the thread that pulls it.
///
/// Use the [`Iterator`] impl from synchronous code and
/// [`next_async`](ResultStream::next_async) from inside an async runtime.
/// Dropping the stream stops the run and returns the pipeline to
/// [`PipelineStatus::Configured`](crate::core::PipelineStatus::Configured).
pub struct ResultStream<T, E> {
    run_id: Uuid,
    receiver: UnboundedReceiver<Envelope<T, E>>,
    runtime: Option<Runtime>,
    counters: Arc<RunCounters>,
    guard: Option<RunGuard>,
}

impl<T, E> ResultStream<T, E> {
    /// Identifier of this run in log output
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Counters so far
    pub fn stats(&self) -> RunStats {
        self.counters.snapshot()
    }

    /// Whether every lineage has finished and every result was pulled
    pub fn is_finished(&self) -> bool {
        self.runtime.is_none()
    }

    /// Wait for the next result without blocking the current thread
    pub async fn next_async(&mut self) -> Option<std::result::Result<T, E>> {
        let envelope = self.receiver.recv().await;
        self.unpack(envelope)
    }

    fn unpack(&mut self, envelope: Option<Envelope<T, E>>) -> Option<std::result::Result<T, E>> {
        match envelope {
            Some(Envelope::Output(value)) => Some(Ok(value)),
            Some(Envelope::Failed(error)) => Some(Err(error)),
            Some(Envelope::Panicked(payload)) => panic::resume_unwind(payload),
            None => {
                self.finish();
                None
            }
        }
    }

    fn finish(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let stats = self.counters.snapshot();
            info!(
                "Run {} finished: {} output(s), {} failure(s), {} dropped lineage(s)",
                self.run_id, stats.outputs, stats.failures, stats.dropped_lineages
            );
            runtime.shutdown_background();
        }
        self.guard.take();
    }
}

impl<T, E> Iterator for ResultStream<T, E> {
    type Item = std::result::Result<T, E>;

    /// Blocks until a result is ready. Must not be called from async code.
    fn next(&mut self) -> Option<Self::Item> {
        let envelope = self.receiver.blocking_recv();
        self.unpack(envelope)
    }
}

impl<T, E> Drop for ResultStream<T, E> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            debug!("Run {} dropped before completion, stopping workers", self.run_id);
            self.receiver.close();
            runtime.shutdown_background();
        }
    }
}

impl<T, E> fmt::Debug for ResultStream<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream")
            .field("run_id", &self.run_id)
            .field("finished", &self.is_finished())
            .field("stats", &self.stats())
            .finish()
    }
}
