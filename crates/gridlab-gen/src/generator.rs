use std::fs;
use std::path::Path;

use gridlab_core::errors::{ErrorInfo, LabError};
use gridlab_core::{Specification, Value};
use serde::{Deserialize, Serialize};

/// Ordered domain of candidate values for a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDomain {
    /// Parameter name, unique within the owning [`GenerationSpec`].
    pub name: String,
    /// Candidate values in declaration order.
    pub values: Vec<Value>,
}

/// Declarative description of the full parameter space.
///
/// Parameter order is the declaration order and fixes the enumeration order
/// of [`generate`]: the last-declared parameter varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSpec {
    parameters: Vec<ParameterDomain>,
}

impl GenerationSpec {
    /// Builds a generation spec from explicitly ordered parameter domains.
    pub fn new(parameters: Vec<ParameterDomain>) -> Self {
        Self { parameters }
    }

    /// Returns the parameter domains in declaration order.
    pub fn parameters(&self) -> &[ParameterDomain] {
        &self.parameters
    }

    /// Number of specifications the cross product will yield.
    ///
    /// The empty product counts one: a spec with no parameters generates a
    /// single empty specification.
    pub fn combination_count(&self) -> usize {
        self.parameters
            .iter()
            .map(|domain| domain.values.len())
            .product()
    }

    /// Parses a generation spec from JSON interchange bytes.
    ///
    /// The document must be an object mapping parameter names to arrays of
    /// candidate values; anything else fails with an input-family error.
    /// File-loaded parameters are ordered by name, which keeps enumeration
    /// deterministic for the same document.
    pub fn from_json_slice(data: &[u8]) -> Result<Self, LabError> {
        let document: serde_json::Value = serde_json::from_slice(data).map_err(|err| {
            LabError::Input(ErrorInfo::new("generation-spec-parse", err.to_string()))
        })?;
        let object = match document {
            serde_json::Value::Object(object) => object,
            other => {
                return Err(LabError::Input(
                    ErrorInfo::new(
                        "generation-spec-shape",
                        "generation spec must be a mapping of name to value sequence",
                    )
                    .with_context("found", json_kind(&other)),
                ))
            }
        };
        let mut parameters = Vec::with_capacity(object.len());
        for (name, domain) in object {
            let values = match domain {
                serde_json::Value::Array(values) => {
                    values.into_iter().map(Value::from_json).collect()
                }
                other => {
                    return Err(LabError::Input(
                        ErrorInfo::new(
                            "generation-spec-domain",
                            "parameter domain must be a sequence of candidate values",
                        )
                        .with_context("parameter", name)
                        .with_context("found", json_kind(&other)),
                    ))
                }
            };
            parameters.push(ParameterDomain { name, values });
        }
        Ok(Self { parameters })
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Loads a generation spec from a JSON interchange file.
pub fn load_generation_spec(path: &Path) -> Result<GenerationSpec, LabError> {
    let bytes = fs::read(path).map_err(|err| {
        LabError::Input(
            ErrorInfo::new("generation-spec-read", "failed to read generation spec")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    GenerationSpec::from_json_slice(&bytes)
}

/// Expands a generation spec into the full cross product of specifications.
///
/// Enumeration is odometer-ordered over the declared parameters: the
/// last-declared parameter varies fastest. Any empty domain collapses the
/// product to an empty sequence. No randomness, no side effects.
pub fn generate(spec: &GenerationSpec) -> Vec<Specification> {
    let mut outputs = Vec::with_capacity(spec.combination_count());
    expand(spec.parameters(), 0, Specification::new(), &mut outputs);
    outputs
}

fn expand(
    domains: &[ParameterDomain],
    idx: usize,
    current: Specification,
    outputs: &mut Vec<Specification>,
) {
    if idx == domains.len() {
        outputs.push(current);
        return;
    }
    let domain = &domains[idx];
    for value in &domain.values {
        let mut next = current.clone();
        next.insert(domain.name.clone(), value.clone());
        expand(domains, idx + 1, next, outputs);
    }
}
