//! SafeCommandExecutor: Type-safe execution of the `dotnet` and `git` toolchains
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only `dotnet` and `git` can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Secret masking**: Echoed command lines go through [`SecureTokenManager`]
//! - **Working directory validation**: Validates existence before execution
//!
//! Whether a finished command counts as failed is decided by [`FailureDetection`], which is
//! applied uniformly to every invocation.

use crate::core::error::PublishError;
use crate::security::token_manager::SecureTokenManager;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands whitelist for security.
const ALLOWED_COMMANDS: &[&str] = &["dotnet", "git"];

lazy_static! {
    static ref ERROR_PATTERN: Regex = Regex::new(r"error.*").expect("valid error pattern");
}

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),
}

/// Result of a finished subprocess
///
/// For inherited-stdio runs `stdout` and `stderr` are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

/// Runs external programs for the publish pipeline
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command with stdout/stderr captured
    async fn capture(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;

    /// Runs a command in the foreground, inheriting the parent's stdio
    async fn inherit(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}

/// How a finished subprocess is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureDetection {
    /// Non-zero exit status is fatal
    #[default]
    ExitStatus,
    /// Captured stdout containing `error` is fatal; inherited runs are not checked
    OutputPattern,
    /// Either signal is fatal
    Both,
}

impl FailureDetection {
    /// Returns the failure message, or `None` when the command succeeded
    pub fn failure(&self, command_line: &str, output: &CommandOutput) -> Option<String> {
        let pattern_hit = ERROR_PATTERN
            .find(&output.stdout)
            .map(|m| m.as_str().trim_end().to_string());

        let exit_failure = || {
            if output.success() {
                return None;
            }
            Some(pattern_hit.clone().unwrap_or_else(|| {
                format!("`{}` failed with {}", command_line, output.status_text())
            }))
        };

        match self {
            Self::ExitStatus => exit_failure(),
            Self::OutputPattern => pattern_hit.clone(),
            Self::Both => exit_failure().or_else(|| pattern_hit.clone()),
        }
    }

    /// Like [`failure`](Self::failure), for runs whose output was not captured
    pub fn inherited_failure(&self, command_line: &str, output: &CommandOutput) -> Option<String> {
        match self {
            Self::OutputPattern => None,
            _ => self.failure(command_line, output),
        }
    }

    /// Converts a failure into a `PublishError::ToolchainError`
    pub fn check(
        &self,
        command_line: &str,
        output: &CommandOutput,
        captured: bool,
    ) -> Result<(), PublishError> {
        let failure = if captured {
            self.failure(command_line, output)
        } else {
            self.inherited_failure(command_line, output)
        };

        match failure {
            Some(message) => Err(PublishError::ToolchainError {
                command: command_line.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}

impl FromStr for FailureDetection {
    type Err = PublishError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "exit-status" => Ok(Self::ExitStatus),
            "output-pattern" => Ok(Self::OutputPattern),
            "both" => Ok(Self::Both),
            other => Err(PublishError::config(format!(
                "FAILURE_DETECTION must be one of exit-status, output-pattern, both (got `{}`)",
                other
            ))),
        }
    }
}

/// Safe command executor with security controls
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
    /// Secrets masked out of echoed command lines and captured output
    tokens: SecureTokenManager,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.exists() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self {
            working_dir,
            tokens: SecureTokenManager::new(),
        })
    }

    /// Use `tokens` to mask secrets in echoed command lines
    pub fn with_tokens(mut self, tokens: SecureTokenManager) -> Self {
        self.tokens = tokens;
        self
    }

    fn command(&self, program: &str, args: &[String]) -> Result<Command, CommandError> {
        if !ALLOWED_COMMANDS.contains(&program) {
            return Err(CommandError::CommandNotAllowed(program.to_string()));
        }

        println!(
            "executing: [{}]",
            self.tokens.mask_tokens_in_string(&command_line(program, args))
        );

        let mut command = Command::new(program);
        command.args(args).current_dir(&self.working_dir);
        Ok(command)
    }

    async fn wait(&self, mut command: Command) -> Result<std::process::Output, CommandError> {
        command
            .output()
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn capture(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let mut command = self.command(program, args)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = self.wait(command).await?;
        tracing::debug!(program, code = ?output.status.code(), "captured command finished");

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    async fn inherit(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        let mut command = self.command(program, args)?;
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let output = self.wait(command).await?;
        tracing::debug!(program, code = ?output.status.code(), "foreground command finished");

        Ok(CommandOutput {
            code: output.status.code(),
            ..CommandOutput::default()
        })
    }
}

/// Space-joined command line for logs and error messages
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
