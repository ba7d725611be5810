//! Execution state models

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle of a pipeline instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStatus {
    /// Steps and pool size are set; no result stream is open
    Configured,
    /// A result stream from `run` is still open
    Running,
}

/// Counters for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Seed items submitted
    pub seeds: u64,
    /// Step invocations, including ones that failed or panicked
    pub step_invocations: u64,
    /// Step results that were a fan-out
    pub fan_outs: u64,
    /// Lineages ended by an empty fan-out
    pub dropped_lineages: u64,
    /// Step invocations that returned an error
    pub failures: u64,
    /// Step invocations that panicked
    pub panics: u64,
    /// Final outputs delivered to the stream
    pub outputs: u64,
}

#[derive(Debug, Default)]
pub(crate) struct RunCounters {
    seeds: AtomicU64,
    step_invocations: AtomicU64,
    fan_outs: AtomicU64,
    dropped_lineages: AtomicU64,
    failures: AtomicU64,
    panics: AtomicU64,
    outputs: AtomicU64,
}

impl RunCounters {
    pub(crate) fn add_seeds(&self, n: u64) {
        self.seeds.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn step_invoked(&self) {
        self.step_invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fanned_out(&self) {
        self.fan_outs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn lineage_dropped(&self) {
        self.dropped_lineages.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn panicked(&self) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn output(&self) {
        self.outputs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RunStats {
        RunStats {
            seeds: self.seeds.load(Ordering::Relaxed),
            step_invocations: self.step_invocations.load(Ordering::Relaxed),
            fan_outs: self.fan_outs.load(Ordering::Relaxed),
            dropped_lineages: self.dropped_lineages.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
            outputs: self.outputs.load(Ordering::Relaxed),
        }
    }
}

/// Marks a pipeline as running until dropped
#[derive(Debug)]
pub(crate) struct RunGuard {
    flag: Arc<AtomicBool>,
}

impl RunGuard {
    /// Returns `None` if the flag is already held
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
