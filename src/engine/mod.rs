//! Execution engine — runs tool handlers under their execution policy.
//!
//! ```text
//!   execute(descriptor, input)
//!        │
//!        ├─ acquire slot ──────────┐   (only if the tool has a concurrency limit;
//!        │                         │    Overload when slots + queue are full)
//!        ├─ spawn handler task ◄───┘   (permit moves into the task)
//!        │
//!        └─ await task until deadline ──► Success | Handler | Timeout
//! ```
//!
//! One deadline (`policy.timeout`) covers both the wait for a slot and the
//! handler itself.
//!
//! Cancellation on timeout is best-effort: the handler task is aborted, which
//! drops it at its next await point. Blocking file I/O already handed to the
//! blocking pool keeps running, so a resource leak is possible for operations
//! that cannot be interrupted. Child processes spawned with `kill_on_drop` are
//! killed.

mod limiter;
mod outcome;

pub use limiter::{ConcurrencyLimiter, LimiterStats};
pub use outcome::{FailureKind, Outcome};

use crate::tools::{ToolDescriptor, ToolRegistry};
use crate::types::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinError;
use tokio::time::Instant;

/// Runs handlers with timeouts, concurrency limits and fault isolation.
#[derive(Debug, Default)]
pub struct ExecutionEngine {
    limiters: HashMap<String, Arc<ConcurrencyLimiter>>,
}

impl ExecutionEngine {
    /// Create limiters for every tool in `registry` that declares a limit.
    ///
    /// Descriptors executed later without a matching limiter run unlimited.
    pub fn new(registry: &ToolRegistry) -> Self {
        let limiters = registry
            .list()
            .into_iter()
            .filter_map(|descriptor| {
                let policy = descriptor.policy();
                policy.concurrency_limit().map(|limit| {
                    (
                        descriptor.name().to_string(),
                        Arc::new(ConcurrencyLimiter::new(limit, policy.max_queue_depth())),
                    )
                })
            })
            .collect();
        Self { limiters }
    }

    /// Counters for a tool's limiter, if it has one.
    pub fn limiter_stats(&self, tool: &str) -> Option<LimiterStats> {
        self.limiters.get(tool).map(|limiter| limiter.stats())
    }

    /// Invoke the handler under its policy. Never fails; every error becomes
    /// an [`Outcome::Failure`].
    pub async fn execute(&self, descriptor: &ToolDescriptor, input: Value) -> Outcome {
        let started = Instant::now();
        let outcome = match self.run(descriptor, input).await {
            Ok(value) => Outcome::success(value),
            Err(err) => Outcome::from(err),
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &outcome {
            Outcome::Success { .. } => {
                tracing::debug!(tool = descriptor.name(), elapsed_ms, "tool succeeded");
            }
            Outcome::Failure { kind, message } => match kind {
                FailureKind::Timeout | FailureKind::Overload => {
                    tracing::warn!(tool = descriptor.name(), elapsed_ms, %kind, "{}", message);
                }
                _ => {
                    tracing::info!(tool = descriptor.name(), elapsed_ms, %kind, "tool failed: {}", message);
                }
            },
        }
        outcome
    }

    async fn run(&self, descriptor: &ToolDescriptor, input: Value) -> Result<Value> {
        let policy = descriptor.policy();
        let deadline = Instant::now() + policy.timeout();
        let timed_out = || Error::Timeout {
            tool: descriptor.name().to_string(),
            timeout_ms: policy.timeout_ms(),
        };

        let permit = match self.limiters.get(descriptor.name()) {
            Some(limiter) => Some(
                tokio::time::timeout_at(deadline, limiter.acquire(descriptor.name()))
                    .await
                    .map_err(|_| timed_out())??,
            ),
            None => None,
        };

        let handler = descriptor.handler();
        let mut task = tokio::spawn(async move {
            // Released when the task completes or is dropped after abort.
            let _permit = permit;
            handler.call(input).await
        });

        match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(err @ Error::Handler(_)))) => Err(err),
            Ok(Ok(Err(err))) => Err(Error::handler(err.to_string())),
            Ok(Err(join_err)) => Err(Error::handler(join_failure_message(join_err))),
            Err(_elapsed) => {
                task.abort();
                tracing::warn!(
                    tool = descriptor.name(),
                    timeout_ms = policy.timeout_ms(),
                    "handler timed out; task aborted"
                );
                Err(timed_out())
            }
        }
    }
}

fn join_failure_message(err: JoinError) -> String {
    if !err.is_panic() {
        return "handler task was cancelled".to_string();
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    tracing::error!("handler panicked: {}", detail);
    format!("handler panicked: {}", detail)
}
