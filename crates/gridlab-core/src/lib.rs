#![deny(missing_docs)]
#![doc = "Core data model, identity hashing, and error types for the gridlab batch engine."]

pub mod errors;
mod identity;
mod record;
/// Canonical JSON serde helpers.
pub mod serde;
mod value;

pub use errors::{ErrorInfo, LabError};
pub use identity::SpecificationIdentity;
pub use record::{
    record_from_binary_slice, record_from_json_slice, record_to_binary_bytes,
    record_to_json_bytes, Record, RecordFormat, ResultMap, Specification,
};
pub use value::Value;
