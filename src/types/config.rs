//! Configuration structures.
//!
//! Configuration is loaded from an optional JSON file, then overridden by
//! environment variables.

use crate::types::Error;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var overriding `server.listen_addr`.
pub const ENV_LISTEN_ADDR: &str = "MCP_GATEWAY_LISTEN_ADDR";
/// Env var overriding `observability.log_level`.
pub const ENV_LOG_LEVEL: &str = "MCP_GATEWAY_LOG_LEVEL";

const RUN_TESTS_TIMEOUT: Duration = Duration::from_secs(300);

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Builtin tool policies.
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    /// Load configuration from `path` (JSON) if given, else defaults, then
    /// apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> crate::types::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                serde_json::from_str::<Config>(&raw).map_err(|e| {
                    Error::config(format!("cannot parse {}: {}", path.display(), e))
                })?
            }
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `MCP_GATEWAY_*` overrides; empty values are ignored.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var(ENV_LISTEN_ADDR).filter(|v| !v.is_empty()) {
            self.server.listen_addr = addr;
        }
        if let Some(level) = var(ENV_LOG_LEVEL).filter(|v| !v.is_empty()) {
            self.observability.log_level = level;
        }
    }

    /// Reject values the engine cannot honor.
    pub fn validate(&self) -> crate::types::Result<()> {
        if self.server.max_body_bytes == 0 {
            return Err(Error::config("server.max_body_bytes must be positive"));
        }
        if self.tools.defaults.timeout.is_zero() {
            return Err(Error::config("tools.defaults.timeout must be positive"));
        }
        for (name, policy) in [
            ("read_file", &self.tools.read_file),
            ("write_file", &self.tools.write_file),
            ("run_tests", &self.tools.run_tests.policy),
        ] {
            if policy.timeout.is_some_and(|t| t.is_zero()) {
                return Err(Error::config(format!("tools.{name}.timeout must be positive")));
            }
            if policy.concurrency_limit == Some(0) {
                return Err(Error::config(format!(
                    "tools.{name}.concurrency_limit must be positive"
                )));
            }
        }
        if self.tools.run_tests.command.is_empty() {
            return Err(Error::config("tools.run_tests.command cannot be empty"));
        }
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP bind address.
    pub listen_addr: String,

    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,

    /// Time allowed for in-flight requests after shutdown is requested.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4000".to_string(),
            max_body_bytes: 1024 * 1024,
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Tracing log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Builtin tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolsConfig {
    /// Fallbacks for anything a per-tool policy leaves unset.
    #[serde(default)]
    pub defaults: PolicyDefaults,

    #[serde(default)]
    pub read_file: ToolPolicyConfig,

    /// Unset fields fall back to one invocation at a time.
    #[serde(
        default = "ToolPolicyConfig::serialized",
        deserialize_with = "deserialize_write_file"
    )]
    #[schemars(with = "ToolPolicyConfig")]
    pub write_file: ToolPolicyConfig,

    /// Unset policy fields fall back to a 300s timeout, one run at a time.
    #[serde(default, deserialize_with = "deserialize_run_tests")]
    #[schemars(with = "RunTestsConfig")]
    pub run_tests: RunTestsConfig,
}

fn deserialize_write_file<'de, D>(deserializer: D) -> std::result::Result<ToolPolicyConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let mut policy = ToolPolicyConfig::deserialize(deserializer)?;
    policy.concurrency_limit.get_or_insert(1);
    Ok(policy)
}

fn deserialize_run_tests<'de, D>(deserializer: D) -> std::result::Result<RunTestsConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let mut config = RunTestsConfig::deserialize(deserializer)?;
    config.policy.timeout.get_or_insert(RUN_TESTS_TIMEOUT);
    config.policy.concurrency_limit.get_or_insert(1);
    Ok(config)
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            defaults: PolicyDefaults::default(),
            read_file: ToolPolicyConfig::default(),
            write_file: ToolPolicyConfig::serialized(),
            run_tests: RunTestsConfig::default(),
        }
    }
}

/// Default execution policy values.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PolicyDefaults {
    /// Deadline covering slot acquisition and handler execution.
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// Waiters allowed per tool once all concurrency slots are taken.
    pub max_queue_depth: usize,
}

impl Default for PolicyDefaults {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_queue_depth: 16,
        }
    }
}

/// Per-tool execution policy overrides.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct ToolPolicyConfig {
    #[serde(default, with = "humantime_serde")]
    #[schemars(with = "Option<String>")]
    pub timeout: Option<Duration>,

    /// Maximum concurrent invocations; unset means unlimited.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,

    #[serde(default)]
    pub max_queue_depth: Option<usize>,
}

impl ToolPolicyConfig {
    /// One invocation at a time.
    fn serialized() -> Self {
        Self {
            timeout: None,
            concurrency_limit: Some(1),
            max_queue_depth: None,
        }
    }
}

/// `runTests` configuration: policy plus the command it runs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunTestsConfig {
    #[serde(flatten)]
    pub policy: ToolPolicyConfig,

    /// Program and arguments, e.g. `["pytest", "tests/"]`.
    #[serde(default = "default_test_command")]
    pub command: Vec<String>,

    /// Working directory; defaults to the gateway's own.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Default for RunTestsConfig {
    fn default() -> Self {
        Self {
            policy: ToolPolicyConfig {
                timeout: Some(RUN_TESTS_TIMEOUT),
                concurrency_limit: Some(1),
                max_queue_depth: None,
            },
            command: default_test_command(),
            working_dir: None,
        }
    }
}

fn default_test_command() -> Vec<String> {
    vec!["pytest".to_string(), "tests/".to_string()]
}
