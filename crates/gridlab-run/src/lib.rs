#![deny(missing_docs)]
#![doc = "Resumable batch execution engine: backends, checkpoint store, and batch runner."]

/// Execution backends (sequential and worker pool).
pub mod backend;
/// The user-facing experiment contract.
pub mod experiment;
/// Batch orchestration and lifecycle hooks.
pub mod runner;
/// On-disk checkpoint store with format fallback.
pub mod store;

pub use backend::{
    ExecutionBackend, PendingSpec, SequentialBackend, SpecOutcome, WorkerPoolBackend,
};
pub use experiment::{Experiment, RunContext};
pub use runner::{BatchHooks, BatchReport, Runner};
pub use store::{BatchSummary, CheckpointStore, ResumeState, COMPLETION_MARKER};
