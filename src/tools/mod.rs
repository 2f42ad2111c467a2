//! Tool infrastructure — registry, input schemas and builtin tools.
//!
//! Descriptors are registered once at startup. Handlers reach the file system
//! and child processes only through injected [`Capabilities`].

pub mod builtin;
pub mod capability;
pub mod catalog;
pub mod schema;

pub use builtin::builtin_registry;
pub use capability::{Capabilities, CommandRunner, CommandLine, FileStore};
pub use catalog::{
    ExecutionPolicy, ToolDescriptor, ToolHandler, ToolRegistry, ToolRegistryBuilder, ToolSummary,
};
pub use schema::{InputSchema, ParamDef, ParamType};
