//! Builtin catalog: `readFile`, `writeFile`, `runTests`.

use crate::tools::capability::{Capabilities, CommandRunner, CommandLine, FileStore};
use crate::tools::catalog::{ExecutionPolicy, ToolDescriptor, ToolHandler, ToolRegistry};
use crate::tools::schema::{InputSchema, ParamDef, ParamType};
use crate::types::{Error, PolicyDefaults, Result, ToolPolicyConfig, ToolsConfig};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

pub const READ_FILE: &str = "readFile";
pub const WRITE_FILE: &str = "writeFile";
pub const RUN_TESTS: &str = "runTests";

/// Marker returned by a successful `writeFile`.
pub const WRITE_OK: &str = "success";

/// Build the registry of builtin tools bound to `caps`.
pub fn builtin_registry(config: &ToolsConfig, caps: &Capabilities) -> Result<ToolRegistry> {
    let defaults = &config.defaults;
    let command = CommandLine::from_argv(
        &config.run_tests.command,
        config.run_tests.working_dir.clone(),
    )
    .ok_or_else(|| Error::config("tools.run_tests.command cannot be empty"))?;

    let mut builder = ToolRegistry::builder();
    builder
        .register(ToolDescriptor::new(
            READ_FILE,
            "Read a text file and return its contents",
            InputSchema::Params(vec![ParamDef::required(
                "path",
                ParamType::String,
                "Path of the file to read",
            )]),
            policy_from(defaults, &config.read_file)?,
            Arc::new(ReadFileTool::new(Arc::clone(&caps.files))),
        ))?
        .register(ToolDescriptor::new(
            WRITE_FILE,
            "Write text to a file, replacing its contents",
            InputSchema::Params(vec![
                ParamDef::required("path", ParamType::String, "Path of the file to write"),
                ParamDef::required("content", ParamType::String, "Text to write"),
            ]),
            policy_from(defaults, &config.write_file)?,
            Arc::new(WriteFileTool::new(Arc::clone(&caps.files))),
        ))?
        .register(ToolDescriptor::new(
            RUN_TESTS,
            format!("Run the project test command (`{}`)", command),
            InputSchema::empty(),
            policy_from(defaults, &config.run_tests.policy)?,
            Arc::new(RunTestsTool::new(Arc::clone(&caps.commands), command)),
        ))?;
    Ok(builder.build())
}

/// Resolve a per-tool policy against the defaults.
pub fn policy_from(defaults: &PolicyDefaults, tool: &ToolPolicyConfig) -> Result<ExecutionPolicy> {
    let policy = ExecutionPolicy::new(tool.timeout.unwrap_or(defaults.timeout))?;
    Ok(match tool.concurrency_limit {
        Some(limit) => {
            let limit = NonZeroUsize::new(limit)
                .ok_or_else(|| Error::invalid_descriptor("concurrency limit must be positive"))?;
            policy.with_concurrency_limit(
                limit,
                tool.max_queue_depth.unwrap_or(defaults.max_queue_depth),
            )
        }
        None => policy,
    })
}

// =============================================================================
// readFile
// =============================================================================

#[derive(Debug, Deserialize)]
struct ReadFileInput {
    path: PathBuf,
}

/// Returns a file's contents as text.
#[derive(Clone)]
pub struct ReadFileTool {
    files: Arc<dyn FileStore>,
}

impl ReadFileTool {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }
}

impl fmt::Debug for ReadFileTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadFileTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolHandler for ReadFileTool {
    async fn call(&self, input: Value) -> Result<Value> {
        let input: ReadFileInput = serde_json::from_value(input)?;
        let content = self
            .files
            .read_to_string(&input.path)
            .await
            .map_err(|e| Error::handler(format!("cannot read {}: {}", input.path.display(), e)))?;
        Ok(Value::String(content))
    }
}

// =============================================================================
// writeFile
// =============================================================================

#[derive(Debug, Deserialize)]
struct WriteFileInput {
    path: PathBuf,
    content: String,
}

/// Replaces a file's contents with the given text.
#[derive(Clone)]
pub struct WriteFileTool {
    files: Arc<dyn FileStore>,
}

impl WriteFileTool {
    pub fn new(files: Arc<dyn FileStore>) -> Self {
        Self { files }
    }
}

impl fmt::Debug for WriteFileTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteFileTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolHandler for WriteFileTool {
    async fn call(&self, input: Value) -> Result<Value> {
        let input: WriteFileInput = serde_json::from_value(input)?;
        self.files
            .write(&input.path, &input.content)
            .await
            .map_err(|e| Error::handler(format!("cannot write {}: {}", input.path.display(), e)))?;
        Ok(Value::String(WRITE_OK.to_string()))
    }
}

// =============================================================================
// runTests
// =============================================================================

/// Runs the configured test command and returns its combined output.
#[derive(Clone)]
pub struct RunTestsTool {
    runner: Arc<dyn CommandRunner>,
    command: CommandLine,
}

impl RunTestsTool {
    pub fn new(runner: Arc<dyn CommandRunner>, command: CommandLine) -> Self {
        Self { runner, command }
    }
}

impl fmt::Debug for RunTestsTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunTestsTool")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ToolHandler for RunTestsTool {
    async fn call(&self, _input: Value) -> Result<Value> {
        let output = self
            .runner
            .run(&self.command)
            .await
            .map_err(|e| Error::handler(format!("cannot run `{}`: {}", self.command, e)))?;

        if output.success {
            return Ok(Value::String(output.stdout + &output.stderr));
        }

        tracing::debug!(command = %self.command, code = ?output.code, "test command failed");
        if output.stderr.trim().is_empty() {
            let status = output
                .code
                .map_or_else(|| "a signal".to_string(), |c| format!("status {}", c));
            Err(Error::handler(format!(
                "`{}` exited with {}\n{}",
                self.command, status, output.stdout
            )))
        } else {
            Err(Error::handler(output.stderr))
        }
    }
}
