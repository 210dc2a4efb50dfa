use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use gridlab_core::errors::{ErrorInfo, LabError};
use gridlab_core::{ResultMap, Specification, SpecificationIdentity};

use crate::experiment::{Experiment, RunContext};

/// A specification admitted for execution, paired with its identity.
#[derive(Debug, Clone)]
pub struct PendingSpec {
    /// The specification to execute.
    pub specification: Specification,
    /// Its canonical identity, derived before dispatch.
    pub identity: SpecificationIdentity,
}

/// Terminal outcome for one dispatched specification.
#[derive(Debug)]
pub struct SpecOutcome {
    /// The specification that was executed.
    pub specification: Specification,
    /// Its canonical identity.
    pub identity: SpecificationIdentity,
    /// The result mapping, or the failure that ended the attempt.
    pub outcome: Result<ResultMap, LabError>,
}

/// Strategy for running a set of pending specifications.
///
/// Implementations yield exactly one outcome per pending specification
/// through `sink`, in completion order. A failing specification must never
/// abort the remaining ones.
pub trait ExecutionBackend {
    /// Runs the pending set against the experiment.
    fn execute(
        &self,
        batch: &str,
        experiment: &dyn Experiment,
        pending: Vec<PendingSpec>,
        sink: &mut dyn FnMut(SpecOutcome),
    ) -> Result<(), LabError>;
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Runs one specification with the panic boundary every backend relies on.
fn run_guarded(
    experiment: &dyn Experiment,
    specification: &Specification,
    ctx: &RunContext,
) -> Result<ResultMap, LabError> {
    log::debug!(target: ctx.log_target(), "starting specification");
    let invocation =
        panic::catch_unwind(AssertUnwindSafe(|| experiment.run(specification, ctx)));
    let outcome = match invocation {
        Ok(result) => result,
        Err(payload) => Err(LabError::Experiment(
            ErrorInfo::new("experiment-panicked", panic_message(payload))
                .with_context("identity", ctx.identity().as_str()),
        )),
    };
    match &outcome {
        Ok(_) => log::debug!(target: ctx.log_target(), "specification finished"),
        Err(err) => log::warn!(target: ctx.log_target(), "specification failed: {err}"),
    }
    outcome
}

/// Runs specifications one at a time in submission order, in the caller's
/// own thread of control.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialBackend;

impl ExecutionBackend for SequentialBackend {
    fn execute(
        &self,
        batch: &str,
        experiment: &dyn Experiment,
        pending: Vec<PendingSpec>,
        sink: &mut dyn FnMut(SpecOutcome),
    ) -> Result<(), LabError> {
        for job in pending {
            let ctx = RunContext::new(batch, &job.identity);
            let outcome = run_guarded(experiment, &job.specification, &ctx);
            sink(SpecOutcome {
                specification: job.specification,
                identity: job.identity,
                outcome,
            });
        }
        Ok(())
    }
}

/// Dispatches specifications to a fixed-size pool of worker threads.
///
/// Workers pull jobs from a shared cursor and report outcomes over a bounded
/// channel to the supervising caller, so results arrive in completion order
/// rather than submission order. Every invocation runs behind a panic
/// boundary; a fault in one specification cannot terminate sibling workers
/// or the orchestrator. A worker lost mid-specification leaves a gap that is
/// reported as a failure for that specification, never silently dropped.
#[derive(Debug, Clone, Copy)]
pub struct WorkerPoolBackend {
    workers: usize,
}

impl WorkerPoolBackend {
    /// Builds a pool backend with the given number of workers (minimum one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Number of worker threads the pool will spawn.
    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl ExecutionBackend for WorkerPoolBackend {
    fn execute(
        &self,
        batch: &str,
        experiment: &dyn Experiment,
        pending: Vec<PendingSpec>,
        sink: &mut dyn FnMut(SpecOutcome),
    ) -> Result<(), LabError> {
        let total = pending.len();
        if total == 0 {
            return Ok(());
        }
        let workers = self.workers.min(total);
        let cursor = AtomicUsize::new(0);
        let jobs = pending;
        let (tx, rx) = mpsc::sync_channel::<(usize, SpecOutcome)>(workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let cursor = &cursor;
                let jobs = &jobs;
                scope.spawn(move || loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    if index >= jobs.len() {
                        break;
                    }
                    let job = &jobs[index];
                    let ctx = RunContext::new(batch, &job.identity);
                    let outcome = run_guarded(experiment, &job.specification, &ctx);
                    let report = SpecOutcome {
                        specification: job.specification.clone(),
                        identity: job.identity.clone(),
                        outcome,
                    };
                    // The supervisor hanging up means the run is over.
                    if tx.send((index, report)).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            let mut delivered = vec![false; total];
            for (index, outcome) in rx {
                delivered[index] = true;
                sink(outcome);
            }
            for (index, done) in delivered.iter().enumerate() {
                if !done {
                    let job = &jobs[index];
                    log::warn!(
                        "worker lost before reporting specification {}",
                        job.identity.short()
                    );
                    sink(SpecOutcome {
                        specification: job.specification.clone(),
                        identity: job.identity.clone(),
                        outcome: Err(LabError::Experiment(
                            ErrorInfo::new(
                                "worker-lost",
                                "worker terminated without reporting an outcome",
                            )
                            .with_context("identity", job.identity.as_str()),
                        )),
                    });
                }
            }
        });
        Ok(())
    }
}
