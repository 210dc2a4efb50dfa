use gridlab_core::errors::{ErrorInfo, LabError};
use gridlab_core::Specification;

use crate::generator::{generate, GenerationSpec};

/// Deterministic selector for one machine's share of the cross product.
///
/// Machine `machine_index` of `machine_count` receives exactly the elements
/// at positions `i` with `i % machine_count == machine_index` of the full
/// enumeration, preserving relative order. The partition/union guarantees
/// hold only between generators constructed with the *same* `machine_count`;
/// comparing shares taken under different counts is a caller error the
/// selector does not reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionGenerator {
    machine_index: usize,
    machine_count: usize,
}

impl PartitionGenerator {
    /// Validates and builds a partition generator.
    ///
    /// Fails with an argument-family error unless
    /// `machine_index < machine_count` and `machine_count >= 1`.
    pub fn new(machine_index: usize, machine_count: usize) -> Result<Self, LabError> {
        if machine_count == 0 || machine_index >= machine_count {
            return Err(LabError::Argument(
                ErrorInfo::new(
                    "partition-bounds",
                    "machine_index must satisfy 0 <= machine_index < machine_count",
                )
                .with_context("machine_index", machine_index.to_string())
                .with_context("machine_count", machine_count.to_string()),
            ));
        }
        Ok(Self {
            machine_index,
            machine_count,
        })
    }

    /// Returns the index of the machine this generator serves.
    pub fn machine_index(&self) -> usize {
        self.machine_index
    }

    /// Returns the machine count the partitioning was fixed against.
    pub fn machine_count(&self) -> usize {
        self.machine_count
    }

    /// Generates this machine's share of the cross product.
    ///
    /// Runs the full enumeration locally and keeps every
    /// `machine_count`-th element starting at `machine_index`; no
    /// communication with other machines is required.
    pub fn generate(&self, spec: &GenerationSpec) -> Vec<Specification> {
        generate(spec)
            .into_iter()
            .skip(self.machine_index)
            .step_by(self.machine_count)
            .collect()
    }
}
