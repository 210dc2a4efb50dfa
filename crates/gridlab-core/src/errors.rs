//! Structured error types shared across gridlab crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`LabError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (batch names, paths, sizes, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the gridlab engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum LabError {
    /// Malformed generation-spec input (bad file shape or unparseable content).
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Invalid construction arguments (bad partition parameters).
    #[error("argument error: {0}")]
    Argument(ErrorInfo),
    /// A single experiment invocation failed or panicked.
    #[error("experiment error: {0}")]
    Experiment(ErrorInfo),
    /// Serialization and canonicalization errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// A record could not be persisted in either supported format.
    #[error("persistence error: {0}")]
    Persistence(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl LabError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            LabError::Input(info)
            | LabError::Argument(info)
            | LabError::Experiment(info)
            | LabError::Serde(info)
            | LabError::Persistence(info) => info,
        }
    }

    /// Convenience constructor for experiment-side failures.
    pub fn experiment(message: impl Into<String>) -> Self {
        LabError::Experiment(ErrorInfo::new("experiment-failed", message))
    }
}
