use std::collections::BTreeMap;
use std::collections::BTreeSet;

use gridlab_core::{LabError, ResultMap, Specification, SpecificationIdentity, Value};
use gridlab_run::{
    Experiment, ExecutionBackend, PendingSpec, RunContext, SequentialBackend, WorkerPoolBackend,
};

/// Doubles the seed; fails on negative seeds, panics on zero.
struct TemperamentalExperiment;

impl Experiment for TemperamentalExperiment {
    fn run(
        &self,
        specification: &Specification,
        _ctx: &RunContext,
    ) -> Result<ResultMap, LabError> {
        let seed = match specification.get("seed") {
            Some(Value::Int(seed)) => *seed,
            other => return Err(LabError::experiment(format!("bad seed: {other:?}"))),
        };
        if seed == 0 {
            panic!("zero seed");
        }
        if seed < 0 {
            return Err(LabError::experiment("negative seed"));
        }
        let mut result = BTreeMap::new();
        result.insert("doubled".to_string(), Value::Int(seed * 2));
        Ok(result)
    }
}

fn pending(seeds: &[i64]) -> Vec<PendingSpec> {
    seeds
        .iter()
        .map(|&seed| {
            let mut specification = Specification::new();
            specification.insert("seed".to_string(), Value::Int(seed));
            let identity = SpecificationIdentity::of(&specification).expect("identity");
            PendingSpec {
                specification,
                identity,
            }
        })
        .collect()
}

#[test]
fn sequential_backend_preserves_submission_order() {
    let mut seen = Vec::new();
    SequentialBackend
        .execute(
            "order",
            &TemperamentalExperiment,
            pending(&[3, 1, 2]),
            &mut |outcome| {
                seen.push(outcome.specification["seed"].clone());
            },
        )
        .expect("execute");
    assert_eq!(
        seen,
        vec![Value::Int(3), Value::Int(1), Value::Int(2)]
    );
}

#[test]
fn failing_specification_does_not_abort_the_rest() {
    let mut ok = 0;
    let mut failed = 0;
    SequentialBackend
        .execute(
            "isolation",
            &TemperamentalExperiment,
            pending(&[1, -5, 2]),
            &mut |outcome| match outcome.outcome {
                Ok(_) => ok += 1,
                Err(_) => failed += 1,
            },
        )
        .expect("execute");
    assert_eq!(ok, 2);
    assert_eq!(failed, 1);
}

#[test]
fn panicking_specification_is_converted_to_a_failure() {
    let mut outcomes = Vec::new();
    SequentialBackend
        .execute(
            "panic",
            &TemperamentalExperiment,
            pending(&[0, 4]),
            &mut |outcome| outcomes.push(outcome),
        )
        .expect("execute");
    assert_eq!(outcomes.len(), 2);
    let failure = outcomes
        .iter()
        .find(|o| o.outcome.is_err())
        .expect("one failure");
    assert_eq!(failure.specification["seed"], Value::Int(0));
}

#[test]
fn worker_pool_yields_one_outcome_per_specification() {
    let jobs = pending(&[1, 2, 0, 4, -5, 6, 7, 8]);
    let expected: BTreeSet<SpecificationIdentity> =
        jobs.iter().map(|job| job.identity.clone()).collect();

    let mut seen = BTreeSet::new();
    let mut ok = 0;
    let mut failed = 0;
    WorkerPoolBackend::new(3)
        .execute("pool", &TemperamentalExperiment, jobs, &mut |outcome| {
            seen.insert(outcome.identity.clone());
            match outcome.outcome {
                Ok(result) => {
                    assert!(result.contains_key("doubled"));
                    ok += 1;
                }
                Err(_) => failed += 1,
            }
        })
        .expect("execute");

    assert_eq!(seen, expected);
    assert_eq!(ok, 6);
    assert_eq!(failed, 2);
}

#[test]
fn worker_pool_handles_more_workers_than_jobs() {
    let mut count = 0;
    WorkerPoolBackend::new(16)
        .execute(
            "small",
            &TemperamentalExperiment,
            pending(&[1, 2]),
            &mut |_| count += 1,
        )
        .expect("execute");
    assert_eq!(count, 2);
}

#[test]
fn worker_pool_with_empty_pending_set_is_a_no_op() {
    let mut count = 0;
    WorkerPoolBackend::new(4)
        .execute("empty", &TemperamentalExperiment, Vec::new(), &mut |_| {
            count += 1
        })
        .expect("execute");
    assert_eq!(count, 0);
}
