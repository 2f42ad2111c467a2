//! Core types for the gateway.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Per-request identifiers for tracing
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the server, logging and tool policies

mod config;
mod errors;
mod ids;

pub use config::{
    Config, ObservabilityConfig, PolicyDefaults, RunTestsConfig, ServerConfig, ToolPolicyConfig,
    ToolsConfig, ENV_LISTEN_ADDR, ENV_LOG_LEVEL,
};
pub use errors::{Error, Result};
pub use ids::RequestId;
