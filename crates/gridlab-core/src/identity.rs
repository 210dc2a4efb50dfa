//! Canonical, order-independent fingerprints for specifications.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::{ErrorInfo, LabError};
use crate::record::Specification;
use crate::value::map_to_json;

/// Canonical fingerprint of a [`Specification`]'s content.
///
/// Two specifications holding the same key/value pairs produce the same
/// identity regardless of insertion order; the identity doubles as the
/// checkpoint key and the record file stem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpecificationIdentity(String);

impl SpecificationIdentity {
    /// Derives the identity from a specification's canonical JSON bytes.
    ///
    /// Fails when the specification cannot be canonicalized (non-finite
    /// floats); such specifications cannot originate from an interchange
    /// file, so this only rejects hand-built pathological inputs.
    pub fn of(specification: &Specification) -> Result<Self, LabError> {
        let canonical = map_to_json(specification)?;
        let bytes = serde_json::to_vec(&canonical).map_err(|err| {
            LabError::Serde(ErrorInfo::new("identity-encode", err.to_string()))
        })?;
        let digest = Sha256::digest(&bytes);
        Ok(Self(format!("{digest:x}")))
    }

    /// Returns the full lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns an abbreviated prefix suitable for log targets.
    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for SpecificationIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
