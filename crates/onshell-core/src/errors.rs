//! Error families raised by the model, the resonance search and the binder.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::ProcessSignature;

/// What went wrong, where, and possibly how to fix it.
///
/// `code` is stable and meant for matching in callers and tests; `context` carries the
/// offending ids or signatures as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case error code, e.g. `unknown-particle`.
    pub code: String,
    /// Message for humans.
    pub message: String,
    /// Offending values keyed by role (`id`, `process`, `order`, ...).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested remedy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a payload without context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records an offending value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Records the signature of the process at fault under `process`.
    pub fn with_process(self, signature: &ProcessSignature) -> Self {
        self.with_context("process", signature.to_string())
    }

    /// Attaches a remedy.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter().map(|(key, value)| format!("{key}={value}"));
        if let Some(first) = entries.next() {
            let rest: Vec<String> = entries.collect();
            write!(f, " {{{first}")?;
            for entry in rest {
                write!(f, ", {entry}")?;
            }
            write!(f, "}}")?;
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

/// Errors of the on-shell subtraction crates, grouped by family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OnShellError {
    /// Unknown particles, interactions or coupling orders.
    #[error("model: {0}")]
    Model(ErrorInfo),
    /// The amplitude generator rejected a process definition.
    #[error("invalid process: {0}")]
    InvalidProcess(ErrorInfo),
    /// A process, decay chain or registry is malformed.
    #[error("structure: {0}")]
    Structure(ErrorInfo),
    /// On-shell terms could not be attached to a matrix element.
    #[error("binding: {0}")]
    Binding(ErrorInfo),
    /// Model cards, options or digests failed to (de)serialize.
    #[error("serde: {0}")]
    Serde(ErrorInfo),
}

impl OnShellError {
    /// Payload of any family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            Self::Model(info)
            | Self::InvalidProcess(info)
            | Self::Structure(info)
            | Self::Binding(info)
            | Self::Serde(info) => info,
        }
    }

    /// Whether the error is the ordinary "no resonance here" outcome of a generation call.
    pub fn is_expected_negative(&self) -> bool {
        matches!(self, Self::InvalidProcess(_))
    }
}
