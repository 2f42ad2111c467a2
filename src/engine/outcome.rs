//! Terminal result of one tool request.

use crate::types::Error;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Why a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownTool,
    SchemaValidation,
    Timeout,
    Overload,
    Handler,
    Internal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnknownTool => "unknown_tool",
            FailureKind::SchemaValidation => "schema_validation",
            FailureKind::Timeout => "timeout",
            FailureKind::Overload => "overload",
            FailureKind::Handler => "handler",
            FailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Success or failure of a single request. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { value: Value },
    Failure { kind: FailureKind, message: String },
}

impl Outcome {
    pub fn success(value: Value) -> Self {
        Outcome::Success { value }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Outcome::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Failure kind, or `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

impl From<Error> for Outcome {
    fn from(err: Error) -> Self {
        Outcome::failure(err.failure_kind(), err.to_string())
    }
}
