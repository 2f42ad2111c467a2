//! Capabilities injected into builtin handlers — file and process access.
//!
//! Handlers never call `tokio::fs` or `tokio::process` directly; they go
//! through these traits so tests can substitute fakes.

use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

/// Text file access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`FileStore`] backed by the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileStore;

#[async_trait]
impl FileStore for LocalFileStore {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl CommandLine {
    /// Build from `[program, args...]`. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String], working_dir: Option<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            working_dir,
        })
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a finished program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Exit code; `None` if killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Process execution.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandLine) -> io::Result<CommandOutput>;
}

/// [`CommandRunner`] spawning real child processes.
///
/// Children are killed when the running future is dropped, so an aborted
/// handler does not leave the process behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine) -> io::Result<CommandOutput> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await?;
        Ok(CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Capability set handed to the builtin tools.
#[derive(Clone)]
pub struct Capabilities {
    pub files: Arc<dyn FileStore>,
    pub commands: Arc<dyn CommandRunner>,
}

impl Capabilities {
    /// Real file system and processes.
    pub fn local() -> Self {
        Self {
            files: Arc::new(LocalFileStore),
            commands: Arc::new(ProcessRunner),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_local_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let store = LocalFileStore;
        store.write(&path, "hello").await.unwrap();
        assert_eq!(store.read_to_string(&path).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_local_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileStore
            .read_to_string(&dir.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_command_line_from_argv() {
        let argv = vec!["pytest".to_string(), "tests/".to_string()];
        let line = CommandLine::from_argv(&argv, None).unwrap();
        assert_eq!(line.program, "pytest");
        assert_eq!(line.args, vec!["tests/"]);
        assert_eq!(line.to_string(), "pytest tests/");
        assert!(CommandLine::from_argv(&[], None).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_captures_output() {
        let line = CommandLine::from_argv(
            &["sh".into(), "-c".into(), "echo out; echo err >&2; exit 3".into()],
            None,
        )
        .unwrap();
        let output = ProcessRunner.run(&line).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success);
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_process_runner_uses_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker"), "").unwrap();
        let line = CommandLine::from_argv(
            &["ls".into()],
            Some(dir.path().to_path_buf()),
        )
        .unwrap();
        let output = ProcessRunner.run(&line).await.unwrap();
        assert!(output.success);
        assert!(output.stdout.contains("marker"));
    }
}
