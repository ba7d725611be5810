//! Test: fan-out and lineage termination at every step boundary

use crate::common::*;
use ppipeline::cli::demo::{number_pipeline, Value};
use ppipeline::{Pipeline, Step, StepOutput, ThreadCount};

fn repeat(k: usize) -> Step<i32, TestError> {
    Step::flat_map(move |x| Ok(vec![x; k])).named("repeat")
}

#[test]
fn test_fan_out_produces_k_items() {
    for k in [1, 2, 5] {
        let pipeline = Pipeline::with_steps(vec![repeat(k), add_1()]);
        let results = collect_sorted(pipeline.run(10).unwrap());
        assert_eq!(results, vec![11; k]);
    }
}

#[test]
fn test_each_branch_runs_remaining_steps() {
    let pipeline = Pipeline::with_steps(vec![
        Step::flat_map(|n: i32| Ok(0..n)),
        add_1(),
        mul_2(),
    ]);
    assert_eq!(collect_sorted(pipeline.run(4).unwrap()), vec![2, 4, 6, 8]);
}

#[test]
fn test_empty_fan_out_drops_lineage() {
    let pipeline = Pipeline::with_steps(vec![
        Step::new(|x: i32| {
            Ok(if x % 2 == 0 {
                StepOutput::Single(x)
            } else {
                StepOutput::none()
            })
        }),
        mul_2(),
    ]);

    let mut stream = pipeline.run_many(1..=6).unwrap();
    let mut results: Vec<i32> = stream.by_ref().map(Result::unwrap).collect();
    results.sort();

    assert_eq!(results, vec![4, 8, 12]);
    let stats = stream.stats();
    assert_eq!(stats.dropped_lineages, 3);
    assert_eq!(stats.outputs, 3);
}

#[test]
fn test_late_step_fan_out() {
    let pipeline = Pipeline::with_steps(vec![add_1(), mul_2(), repeat(3)]);
    assert_eq!(collect_sorted(pipeline.run_many([0, 1]).unwrap()), vec![2, 2, 2, 4, 4, 4]);
}

#[test]
fn test_nested_fan_out() {
    let pipeline: Pipeline<i32, TestError> = Pipeline::with_steps(vec![
        Step::flat_map(|n: i32| Ok(0..n)),
        Step::flat_map(|n: i32| Ok(0..n)),
    ]);
    // 0..4 -> [], [0], [0,1], [0,1,2]
    assert_eq!(collect_sorted(pipeline.run(4).unwrap()), vec![0, 0, 0, 1, 1, 2]);
}

#[test]
fn test_single_collection_is_not_fanned_out() {
    let pipeline: Pipeline<Vec<i32>, TestError> = Pipeline::with_steps(vec![
        Step::map(|mut v: Vec<i32>| {
            v.push(3);
            Ok(v)
        }),
    ]);
    let results: Vec<Vec<i32>> = pipeline
        .run(vec![1, 2])
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(results, vec![vec![1, 2, 3]]);
}

#[test]
fn test_fan_out_stats() {
    let pipeline = Pipeline::with_steps(vec![repeat(3), add_1()]);
    let mut stream = pipeline.run(1).unwrap();
    let count = stream.by_ref().count();
    assert_eq!(count, 3);

    let stats = stream.stats();
    assert_eq!(stats.seeds, 1);
    assert_eq!(stats.fan_outs, 1);
    assert_eq!(stats.step_invocations, 4);
    assert_eq!(stats.outputs, 3);
}

#[test]
fn test_even_odd_scenario() {
    let pipeline = number_pipeline(ThreadCount::Auto).unwrap();
    let mut results: Vec<i64> = pipeline
        .run(Value::Number(5))
        .unwrap()
        .map(|r| match r.unwrap() {
            Value::Number(n) => n,
            other => panic!("unexpected value {:?}", other),
        })
        .collect();
    results.sort();
    assert_eq!(results, vec![0, 3, 4, 9, 16]);
}
