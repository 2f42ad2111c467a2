//! Tool registry — descriptors and their execution policies.
//!
//! The registry is assembled once through [`ToolRegistryBuilder`] and frozen
//! by [`ToolRegistryBuilder::build`]. A built [`ToolRegistry`] has no mutating
//! methods, so request handling never races registry changes.

use crate::tools::schema::InputSchema;
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Handler
// =============================================================================

/// Capability-bound function implementing a tool.
///
/// Input has already passed the tool's schema when `call` runs.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, input: Value) -> Result<Value>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Send + Sync + Fn(Value) -> Fut,
    Fut: Future<Output = Result<Value>> + Send,
{
    async fn call(&self, input: Value) -> Result<Value> {
        (self)(input).await
    }
}

// =============================================================================
// Execution policy
// =============================================================================

/// How the engine runs a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPolicy {
    timeout: Duration,
    concurrency_limit: Option<NonZeroUsize>,
    max_queue_depth: usize,
}

impl ExecutionPolicy {
    /// Policy with the given deadline, no concurrency limit.
    pub fn new(timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::invalid_descriptor("timeout must be positive"));
        }
        Ok(Self {
            timeout,
            concurrency_limit: None,
            max_queue_depth: 0,
        })
    }

    /// Limit concurrent invocations; up to `max_queue_depth` callers wait in
    /// FIFO order once every slot is taken.
    pub fn with_concurrency_limit(mut self, limit: NonZeroUsize, max_queue_depth: usize) -> Self {
        self.concurrency_limit = Some(limit);
        self.max_queue_depth = max_queue_depth;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn concurrency_limit(&self) -> Option<NonZeroUsize> {
        self.concurrency_limit
    }

    pub fn max_queue_depth(&self) -> usize {
        self.max_queue_depth
    }
}

// =============================================================================
// Descriptor
// =============================================================================

/// Registry entry: a tool's name, schema, policy and handler.
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
    policy: ExecutionPolicy,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
        policy: ExecutionPolicy,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            policy,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    pub fn policy(&self) -> &ExecutionPolicy {
        &self.policy
    }

    pub fn handler(&self) -> Arc<dyn ToolHandler> {
        Arc::clone(&self.handler)
    }

    /// Serializable listing entry.
    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.to_json_schema(),
            timeout_ms: self.policy.timeout_ms(),
            concurrency_limit: self.policy.concurrency_limit.map(NonZeroUsize::get),
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("input_schema", &self.input_schema)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Catalog listing entry returned by `GET /tools`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<usize>,
}

// =============================================================================
// Registry
// =============================================================================

/// Collects descriptors before the registry is frozen.
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    entries: HashMap<String, Arc<ToolDescriptor>>,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be non-empty and unique.
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<&mut Self> {
        if descriptor.name.is_empty() {
            return Err(Error::invalid_descriptor("tool name cannot be empty"));
        }
        if self.entries.contains_key(&descriptor.name) {
            return Err(Error::DuplicateTool(descriptor.name));
        }
        self.entries
            .insert(descriptor.name.clone(), Arc::new(descriptor));
        Ok(self)
    }

    pub fn build(self) -> ToolRegistry {
        ToolRegistry {
            entries: self.entries,
        }
    }
}

/// Read-only tool registry.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    entries: HashMap<String, Arc<ToolDescriptor>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }

    /// Get a descriptor by name.
    pub fn lookup(&self, name: &str) -> Result<&Arc<ToolDescriptor>> {
        self.entries
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All descriptors, sorted by name.
    pub fn list(&self) -> Vec<&Arc<ToolDescriptor>> {
        let mut entries: Vec<&Arc<ToolDescriptor>> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
