//! # mcp-gateway - Tool-Dispatch Gateway
//!
//! Accepts `{tool, input}` calls over HTTP and routes them to registered tool
//! handlers:
//! - Closed registry of tool descriptors, built once at startup
//! - Input validation against each tool's declared schema
//! - Per-tool timeouts and concurrency limits with a bounded wait queue
//! - Handler failures and panics contained to the request that caused them
//!
//! ## Architecture
//!
//! ```text
//!   POST /mcp → ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌─────────┐
//!               │ Registry │ → │ Validator │ → │  Engine  │ → │ Encoder │ → HTTP
//!               │  lookup  │   │           │   │ (limits) │   │         │
//!               └──────────┘   └───────────┘   └──────────┘   └─────────┘
//! ```
//!
//! Every stage yields an [`engine::Outcome`]; the encoder maps it to a status
//! code and a `{"result": …}` / `{"error": …}` body.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod engine;
pub mod gateway;
pub mod http;
pub mod tools;
pub mod types;
pub mod validation;

// Internal utilities
pub mod observability;

pub use gateway::{Gateway, ToolRequest};
pub use types::{Config, Error, Result};
