//! Test: lazy results, run exclusivity and stream abandonment

use crate::common::*;
use ppipeline::{Pipeline, PipelineError, PipelineStatus, Step};
use std::time::Duration;

#[test]
fn test_run_returns_before_work_completes() {
    let gate = Gate::new();
    let step_gate = gate.clone();
    let pipeline: Pipeline<i32, TestError> = Pipeline::with_steps(vec![Step::map(move |x| {
        step_gate.wait();
        Ok(x + 1)
    })]);

    // Steps are blocked on the gate, so `run` cannot have waited for them
    let mut stream = pipeline.run(41).unwrap();
    assert_eq!(stream.stats().outputs, 0);

    gate.open();
    assert_eq!(stream.next().unwrap().unwrap(), 42);
    assert!(stream.next().is_none());
}

#[test]
fn test_status_follows_stream() {
    let pipeline = add_then_double();
    assert_eq!(pipeline.status(), PipelineStatus::Configured);

    let mut stream = pipeline.run(1).unwrap();
    assert_eq!(pipeline.status(), PipelineStatus::Running);

    assert_eq!(stream.next().unwrap().unwrap(), 4);
    assert!(stream.next().is_none());
    assert!(stream.is_finished());
    assert_eq!(pipeline.status(), PipelineStatus::Configured);
}

#[test]
fn test_concurrent_run_rejected() {
    let pipeline = add_then_double();
    let stream = pipeline.run(1).unwrap();

    let err = pipeline.run(2).unwrap_err();
    assert!(matches!(err, PipelineError::RunInProgress));

    drop(stream);
    assert_eq!(collect_sorted(pipeline.run(2).unwrap()), vec![6]);
}

#[test]
fn test_abandoned_stream_releases_pipeline() {
    let probe = ConcurrencyProbe::new();
    let pipeline: Pipeline<i32, TestError> =
        Pipeline::with_steps(vec![probe.step(Duration::from_millis(10))])
            .with_thread_count(2)
            .unwrap();

    let mut stream = pipeline.run_many(0..200).unwrap();
    assert!(stream.next().unwrap().is_ok());
    drop(stream);

    assert_eq!(pipeline.status(), PipelineStatus::Configured);

    // Queued work was discarded rather than run to completion
    std::thread::sleep(Duration::from_millis(50));
    assert!(probe.calls() < 200);
}

#[test]
fn test_add_step_after_run_affects_later_runs_only() {
    let mut pipeline = Pipeline::with_steps(vec![add_1()]);
    let stream = pipeline.run(1).unwrap();
    let first = collect_sorted(stream);

    pipeline.add_step(mul_2());
    let second = collect_sorted(pipeline.run(1).unwrap());

    assert_eq!(first, vec![2]);
    assert_eq!(second, vec![4]);
}

#[test]
fn test_run_id_is_unique_per_run() {
    let pipeline = add_then_double();
    let first = pipeline.run(1).unwrap();
    let first_id = first.run_id();
    drop(first);

    let second = pipeline.run(1).unwrap();
    assert_ne!(first_id, second.run_id());
}
