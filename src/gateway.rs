//! Request dispatch: registry lookup, then validation, then execution.

use crate::engine::{ExecutionEngine, LimiterStats, Outcome};
use crate::tools::{builtin_registry, Capabilities, ToolRegistry, ToolSummary};
use crate::types::{RequestId, Result, ToolsConfig};
use crate::validation;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::Instrument;

/// One inbound tool call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolRequest {
    pub tool: String,
    #[serde(default = "empty_object")]
    pub input: Value,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl ToolRequest {
    pub fn new(tool: impl Into<String>, input: Value) -> Self {
        Self {
            tool: tool.into(),
            input,
        }
    }
}

/// Registry plus engine. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct Gateway {
    registry: Arc<ToolRegistry>,
    engine: ExecutionEngine,
}

impl Gateway {
    pub fn new(registry: ToolRegistry) -> Self {
        let engine = ExecutionEngine::new(&registry);
        Self {
            registry: Arc::new(registry),
            engine,
        }
    }

    /// Gateway serving the builtin tools.
    pub fn from_config(config: &ToolsConfig, caps: &Capabilities) -> Result<Self> {
        Ok(Self::new(builtin_registry(config, caps)?))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one request end to end. Never fails.
    pub async fn dispatch(&self, request: ToolRequest) -> Outcome {
        self.dispatch_with_id(RequestId::new(), request).await
    }

    /// Like [`Gateway::dispatch`], tagging logs with a caller-supplied id.
    pub async fn dispatch_with_id(&self, request_id: RequestId, request: ToolRequest) -> Outcome {
        let span = tracing::info_span!(
            "dispatch",
            request_id = %request_id,
            tool = %request.tool,
        );
        self.dispatch_inner(request).instrument(span).await
    }

    async fn dispatch_inner(&self, request: ToolRequest) -> Outcome {
        let descriptor = match self.registry.lookup(&request.tool) {
            Ok(descriptor) => Arc::clone(descriptor),
            Err(err) => {
                tracing::info!("rejected: {}", err);
                return err.into();
            }
        };

        if let Err(err) = validation::validate(&request.input, &descriptor) {
            tracing::info!("rejected: {}", err);
            return err.into();
        }

        self.engine.execute(&descriptor, request.input).await
    }

    /// Catalog listing, sorted by name.
    pub fn list_tools(&self) -> Vec<ToolSummary> {
        self.registry.list().iter().map(|d| d.summary()).collect()
    }

    /// Limiter counters for every tool that has a concurrency limit.
    pub fn limiter_stats(&self) -> Vec<(String, LimiterStats)> {
        self.registry
            .list()
            .iter()
            .filter_map(|d| {
                self.engine
                    .limiter_stats(d.name())
                    .map(|stats| (d.name().to_string(), stats))
            })
            .collect()
    }
}
