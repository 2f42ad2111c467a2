//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use crate::engine::FailureKind;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested tool is not in the registry (maps to HTTP 400).
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Tool input failed its schema (maps to HTTP 400).
    #[error("invalid input: field '{field}': {reason}")]
    SchemaValidation { field: String, reason: String },

    /// Handler did not finish before the tool deadline (maps to HTTP 504).
    #[error("tool '{tool}' timed out after {timeout_ms}ms")]
    Timeout { tool: String, timeout_ms: u64 },

    /// Concurrency slots and wait queue are both full (maps to HTTP 500).
    #[error("tool '{tool}' is overloaded: {reason}")]
    Overload { tool: String, reason: String },

    /// Handler reported a failure or panicked (maps to HTTP 500).
    #[error("{0}")]
    Handler(String),

    /// A tool with the same name is already registered. Fatal at startup.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    /// Descriptor failed its own construction checks. Fatal at startup.
    #[error("invalid tool descriptor: {0}")]
    InvalidDescriptor(String),

    /// Configuration errors. Fatal at startup.
    #[error("config error: {0}")]
    Config(String),

    /// Internal errors (maps to HTTP 500).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error as a per-request failure kind.
    ///
    /// Startup-only errors (duplicate tools, bad config) never reach a
    /// request; if one does, it is reported as internal.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Error::UnknownTool(_) => FailureKind::UnknownTool,
            Error::SchemaValidation { .. } => FailureKind::SchemaValidation,
            Error::Timeout { .. } => FailureKind::Timeout,
            Error::Overload { .. } => FailureKind::Overload,
            Error::Handler(_) | Error::Io(_) => FailureKind::Handler,
            Error::DuplicateTool(_)
            | Error::InvalidDescriptor(_)
            | Error::Config(_)
            | Error::Internal(_)
            | Error::Serialization(_) => FailureKind::Internal,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
