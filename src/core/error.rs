//! Error handling for NuGet publishing
//!
//! Every variant is fatal for the run. The only condition that is downgraded to a
//! warning (a missing push key) never becomes a `PublishError` at all.

use crate::security::{CommandError, SecureTokenManager};
use thiserror::Error;

/// Main error type for a publish run
#[derive(Error, Debug)]
pub enum PublishError {
    /// Missing or malformed configuration
    #[error("{message}")]
    ConfigError { message: String },

    /// Project or version file is absent
    #[error("{message}")]
    NotFound { message: String },

    /// The version pattern did not produce a version
    #[error("{message}")]
    ExtractionError { message: String },

    /// The registry lookup failed
    #[error("error: {message}")]
    NetworkError { message: String },

    /// An external tool (`dotnet`, `git`) reported a failure
    #[error("{message}")]
    ToolchainError { command: String, message: String },

    /// Working-directory I/O (artifact cleanup and scanning)
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PublishError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Masks registered secrets in text that came from tool output
    pub fn masked(self, tokens: &SecureTokenManager) -> Self {
        match self {
            Self::ToolchainError { command, message } => Self::ToolchainError {
                command: tokens.mask_tokens_in_string(&command),
                message: tokens.mask_tokens_in_string(&message),
            },
            other => other,
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::ExtractionError { .. } => "EXTRACTION_ERROR",
            Self::NetworkError { .. } => "NETWORK_ERROR",
            Self::ToolchainError { .. } => "TOOLCHAIN_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::ConfigError { .. } => vec![
                "Check the action inputs in your workflow file",
                "Boolean inputs must be exactly `true` or `false`",
            ],
            Self::NotFound { .. } => vec![
                "Check PROJECT_FILE_PATH / VERSION_FILE_PATH",
                "Paths are relative to the working directory",
            ],
            Self::ExtractionError { .. } => vec![
                "Check that VERSION_REGEX matches the version file",
                "The version must be captured by the first group",
            ],
            Self::NetworkError { .. } => vec![
                "Check NUGET_SOURCE",
                "Check the registry status and network connectivity",
            ],
            Self::ToolchainError { .. } => vec![
                "Check the command output above",
                "Make sure the .NET SDK and git are installed on the runner",
            ],
            Self::Io(_) => vec!["Check permissions on the working directory"],
        }
    }
}

impl From<CommandError> for PublishError {
    fn from(error: CommandError) -> Self {
        let command = match &error {
            CommandError::CommandNotAllowed(command) => command.clone(),
            _ => String::new(),
        };

        Self::ToolchainError {
            command,
            message: error.to_string(),
        }
    }
}
