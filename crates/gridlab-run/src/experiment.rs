use gridlab_core::{LabError, ResultMap, Specification, SpecificationIdentity};

/// Execution context supplied by the engine for one specification.
///
/// Carries a log target scoped to the running specification so experiment
/// output can be routed and filtered per specification through the `log`
/// facade. The engine owns the context for the duration of one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    batch: String,
    identity: SpecificationIdentity,
    log_target: String,
}

impl RunContext {
    pub(crate) fn new(batch: &str, identity: &SpecificationIdentity) -> Self {
        Self {
            batch: batch.to_string(),
            identity: identity.clone(),
            log_target: format!("gridlab::batch::{batch}::{}", identity.short()),
        }
    }

    /// Name of the batch this specification belongs to.
    pub fn batch(&self) -> &str {
        &self.batch
    }

    /// Identity of the specification being executed.
    pub fn identity(&self) -> &SpecificationIdentity {
        &self.identity
    }

    /// Log target scoped to the current specification.
    pub fn log_target(&self) -> &str {
        &self.log_target
    }
}

/// User-supplied unit of work.
///
/// Given one specification, produce a result mapping or fail. Any error or
/// panic is treated as a failure of that single specification, never of the
/// whole batch. Implementations must be callable from worker threads.
pub trait Experiment: Send + Sync {
    /// Executes the experiment for one specification.
    fn run(&self, specification: &Specification, ctx: &RunContext)
        -> Result<ResultMap, LabError>;
}
