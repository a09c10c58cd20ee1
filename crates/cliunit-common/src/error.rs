//! Error types for translation unit handlers.
//!
//! Parsing never fails: an unmatched pattern leaves a field unset. Errors
//! only come from the transport ([`CliError`]) and surface to the caller as
//! a [`ReadError`] or [`WriteError`] carrying the identifier being handled.

use std::io;
use thiserror::Error;

/// Result type alias for CLI transport operations.
pub type CliResult<T> = Result<T, CliError>;

/// Result type alias for read handlers.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type alias for write handlers.
pub type WriteResult<T> = Result<T, WriteError>;

/// Errors raised by a [`Cli`](crate::Cli) session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to start the transport process.
    #[error("Failed to execute '{command}': {source}")]
    Exec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Transport returned a non-zero exit code.
    #[error("Command failed: '{command}' (exit code {exit_code}): {output}")]
    CommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// A captured output file exists but could not be read.
    #[error("Failed to read capture {path}: {source}")]
    Replay {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl CliError {
    /// Creates a command failure.
    pub fn command_failed(
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CliError::CommandFailed { .. })
    }
}

/// Errors raised by readers.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The show command could not be executed.
    #[error("Read of {path} failed: {source}")]
    Failed {
        path: String,
        #[source]
        source: CliError,
    },

    /// No reader is registered for the path.
    #[error("No reader registered for {path}")]
    Unsupported { path: String },

    /// The value read could not be converted for the caller.
    #[error("Read of {path} produced an unserializable value: {message}")]
    Serialize { path: String, message: String },
}

impl ReadError {
    /// Creates a read failure wrapping a transport error.
    pub fn failed(path: impl ToString, source: CliError) -> Self {
        Self::Failed {
            path: path.to_string(),
            source,
        }
    }

    /// Creates an unsupported path error.
    pub fn unsupported(path: impl ToString) -> Self {
        Self::Unsupported {
            path: path.to_string(),
        }
    }
}

/// Errors raised by writers.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Creating the data failed.
    #[error("Create of {path} failed: {message}")]
    CreateFailed { path: String, message: String },

    /// Updating the data failed.
    #[error("Update of {path} failed: {message}")]
    UpdateFailed { path: String, message: String },

    /// Deleting the data failed.
    #[error("Delete of {path} failed: {message}")]
    DeleteFailed { path: String, message: String },

    /// The device answered with an error message.
    #[error("Device rejected command for {path}: '{command}': {output}")]
    DeviceRejected {
        path: String,
        command: String,
        output: String,
    },

    /// The command could not be delivered.
    #[error("Write of {path} failed: {source}")]
    Cli {
        path: String,
        #[source]
        source: CliError,
    },

    /// The command template could not be rendered.
    #[error("Template rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    /// The data handed to the writer is not valid for this device.
    #[error("Invalid data for {path}: {message}")]
    InvalidData { path: String, message: String },

    /// No writer is registered for the path.
    #[error("No writer registered for {path}")]
    Unsupported { path: String },
}

impl WriteError {
    /// Creates a create failure.
    pub fn create_failed(path: impl ToString, message: impl Into<String>) -> Self {
        Self::CreateFailed {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Creates an update failure.
    pub fn update_failed(path: impl ToString, message: impl Into<String>) -> Self {
        Self::UpdateFailed {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Creates a delete failure.
    pub fn delete_failed(path: impl ToString, message: impl Into<String>) -> Self {
        Self::DeleteFailed {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Creates an invalid data error.
    pub fn invalid_data(path: impl ToString, message: impl Into<String>) -> Self {
        Self::InvalidData {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Creates an unsupported path error.
    pub fn unsupported(path: impl ToString) -> Self {
        Self::Unsupported {
            path: path.to_string(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            WriteError::Cli { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReadError::unsupported("/interfaces/interface/state");
        assert_eq!(
            err.to_string(),
            "No reader registered for /interfaces/interface/state"
        );

        let err = WriteError::delete_failed("/interfaces/interface[Gi0/1]/config", "physical");
        assert_eq!(
            err.to_string(),
            "Delete of /interfaces/interface[Gi0/1]/config failed: physical"
        );
    }

    #[test]
    fn test_command_failed() {
        let err = CliError::command_failed("show running-config", 255, "Connection refused");
        assert!(err.to_string().contains("show running-config"));
        assert!(err.to_string().contains("exit code 255"));
    }

    #[test]
    fn test_is_retryable() {
        let cli = CliError::command_failed("show version", 1, "");
        assert!(cli.is_retryable());

        let write = WriteError::Cli {
            path: "/x".to_string(),
            source: cli,
        };
        assert!(write.is_retryable());
        assert!(!WriteError::invalid_data("/x", "bad").is_retryable());
    }
}
