#![deny(missing_docs)]
#![doc = "Specification generation and multi-machine partitioning for the gridlab batch engine."]

mod generator;
mod partition;

pub use generator::{generate, load_generation_spec, GenerationSpec, ParameterDomain};
pub use partition::PartitionGenerator;
