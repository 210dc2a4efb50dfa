use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use gridlab_core::{LabError, Record, ResultMap, Specification, SpecificationIdentity};

use crate::backend::{ExecutionBackend, PendingSpec, SequentialBackend, SpecOutcome};
use crate::experiment::Experiment;
use crate::store::{BatchSummary, CheckpointStore};

/// Side-effect-only lifecycle callbacks attached to a [`Runner`] instance.
///
/// All methods default to no-ops. A panicking hook is logged and swallowed;
/// it never aborts the batch.
pub trait BatchHooks {
    /// Fired after a specification's record has been persisted.
    fn on_specification_complete(&self, _specification: &Specification, _result: &ResultMap) {}

    /// Fired when a specification fails (experiment error, panic, or
    /// unpersistable record).
    fn on_specification_failed(&self, _specification: &Specification, _error: &LabError) {}

    /// Fired once per `run` call after every dispatched specification has
    /// reached a terminal outcome, with all records including resumed ones.
    fn on_batch_complete(&self, _records: &[Record]) {}
}

/// Final summary returned by [`Runner::run`].
#[derive(Debug)]
pub struct BatchReport {
    /// Batch name this report covers.
    pub batch: String,
    /// All records for the batch: resumed plus newly completed.
    pub records: Vec<Record>,
    /// Specifications that completed successfully in this invocation.
    pub completed: usize,
    /// Specifications that failed in this invocation.
    pub failed: usize,
    /// Specifications skipped because their identity was already completed.
    pub skipped: usize,
    /// Record files that failed to deserialize during resume.
    pub corrupt_records: usize,
}

/// Orchestrates one batch lifecycle: load, filter, dispatch, drain, finalize.
///
/// The runner's own control flow is single-threaded; parallelism is confined
/// to the configured [`ExecutionBackend`]. One runner instance is assumed to
/// own a given batch name for the duration of a `run` call.
pub struct Runner {
    store: CheckpointStore,
    backend: Box<dyn ExecutionBackend>,
    hooks: Vec<Box<dyn BatchHooks>>,
}

impl Runner {
    /// Creates a runner persisting batches under the given root directory,
    /// executing sequentially until a backend is configured.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            store: CheckpointStore::new(root),
            backend: Box::new(SequentialBackend),
            hooks: Vec::new(),
        }
    }

    /// Replaces the execution backend.
    pub fn with_backend(mut self, backend: Box<dyn ExecutionBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Attaches a set of lifecycle hooks to this runner instance.
    pub fn with_hooks(mut self, hooks: Box<dyn BatchHooks>) -> Self {
        self.hooks.push(hooks);
        self
    }

    /// The checkpoint store backing this runner, for external tooling that
    /// reads record files directly.
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Runs a named batch of specifications against an experiment.
    ///
    /// With `continue_from_last_run` set, identities already checkpointed
    /// for this batch name are subtracted before dispatch, so the experiment
    /// is never re-invoked for a completed identity. Failures local to one
    /// specification are captured and reported through the hooks; only a
    /// checkpoint-loading failure surfaces here before execution begins.
    pub fn run(
        &self,
        batch: &str,
        specifications: Vec<Specification>,
        experiment: &dyn Experiment,
        continue_from_last_run: bool,
    ) -> Result<BatchReport, LabError> {
        let resume = if continue_from_last_run {
            self.store.load_batch(batch)?
        } else {
            Default::default()
        };
        if !resume.records.is_empty() || !resume.corrupt.is_empty() {
            log::info!(
                "batch {batch}: resuming with {} completed records ({} corrupt skipped)",
                resume.records.len(),
                resume.corrupt.len()
            );
        }

        let mut claimed: BTreeSet<SpecificationIdentity> = resume.completed;
        let mut pending = Vec::new();
        let mut records = resume.records;
        let mut completed = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;

        for specification in specifications {
            match SpecificationIdentity::of(&specification) {
                Ok(identity) => {
                    if claimed.contains(&identity) {
                        skipped += 1;
                        continue;
                    }
                    claimed.insert(identity.clone());
                    pending.push(PendingSpec {
                        specification,
                        identity,
                    });
                }
                Err(err) => {
                    // An identity-less specification can never be
                    // checkpointed; fail it without dispatching.
                    log::warn!("batch {batch}: specification has no identity: {err}");
                    failed += 1;
                    self.fire_failed(&specification, &err);
                }
            }
        }

        log::info!(
            "batch {batch}: dispatching {} specifications ({skipped} already complete)",
            pending.len()
        );

        let store = &self.store;
        let mut sink = |outcome: SpecOutcome| match outcome.outcome {
            Ok(result) => {
                let record = Record {
                    specification: outcome.specification,
                    result,
                };
                match store.save_record(batch, &record) {
                    Ok((identity, format)) => {
                        log::debug!(
                            "batch {batch}: persisted {} as {:?}",
                            identity.short(),
                            format
                        );
                        completed += 1;
                        self.fire_complete(&record.specification, &record.result);
                        records.push(record);
                    }
                    Err(err) => {
                        log::warn!(
                            "batch {batch}: failed to persist {}: {err}",
                            outcome.identity.short()
                        );
                        failed += 1;
                        self.fire_failed(&record.specification, &err);
                    }
                }
            }
            Err(err) => {
                failed += 1;
                self.fire_failed(&outcome.specification, &err);
            }
        };
        self.backend
            .execute(batch, experiment, pending, &mut sink)?;
        drop(sink);

        let summary = BatchSummary {
            batch: batch.to_string(),
            completed,
            failed,
            skipped,
            corrupt_records: resume.corrupt.len(),
        };
        self.store.mark_complete(batch, &summary)?;
        log::info!(
            "batch {batch}: finalized with {completed} completed, {failed} failed, {skipped} skipped"
        );
        self.fire_batch_complete(&records);

        Ok(BatchReport {
            batch: batch.to_string(),
            records,
            completed,
            failed,
            skipped,
            corrupt_records: summary.corrupt_records,
        })
    }

    fn fire_complete(&self, specification: &Specification, result: &ResultMap) {
        for hooks in &self.hooks {
            let call = panic::catch_unwind(AssertUnwindSafe(|| {
                hooks.on_specification_complete(specification, result)
            }));
            if call.is_err() {
                log::warn!("specification-complete hook panicked; continuing batch");
            }
        }
    }

    fn fire_failed(&self, specification: &Specification, error: &LabError) {
        for hooks in &self.hooks {
            let call = panic::catch_unwind(AssertUnwindSafe(|| {
                hooks.on_specification_failed(specification, error)
            }));
            if call.is_err() {
                log::warn!("specification-failed hook panicked; continuing batch");
            }
        }
    }

    fn fire_batch_complete(&self, records: &[Record]) {
        for hooks in &self.hooks {
            let call =
                panic::catch_unwind(AssertUnwindSafe(|| hooks.on_batch_complete(records)));
            if call.is_err() {
                log::warn!("batch-complete hook panicked; continuing");
            }
        }
    }
}
