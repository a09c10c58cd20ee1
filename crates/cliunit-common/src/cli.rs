//! CLI session abstraction and the local transports.
//!
//! Handlers only see the [`Cli`] trait. Two transports ship with the crate:
//!
//! - [`ShellCli`] hands each command to a local program (`ssh admin@r1`,
//!   `vtysh -c`, ...) through `/bin/sh -c`;
//! - [`ReplayCli`] answers from a directory of captured outputs, which is
//!   how handlers are exercised offline.
//!
//! # Example
//!
//! ```ignore
//! use cliunit_common::{Cli, Command, ShellCli};
//!
//! let cli = ShellCli::new("ssh admin@192.0.2.1");
//! let output = cli.execute_and_read(&Command::new("show running-config")).await?;
//! ```

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;

use crate::error::{CliError, CliResult};

/// Path to the shell used by [`ShellCli`].
pub const SH_CMD: &str = "/bin/sh";

/// Characters that need escaping inside shell double quotes. Newlines are
/// kept literal so a configuration block reaches the device line by line.
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\])"#).expect("Invalid regex pattern"));

static CAPTURE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// # Example
///
/// ```
/// use cliunit_common::cli::shellquote;
///
/// assert_eq!(shellquote("show version"), "\"show version\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// A command (or newline separated block of commands) sent to a device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(String);

impl Command {
    pub fn new(command: impl Into<String>) -> Self {
        Command(command.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Command(command)
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Command(command.to_string())
    }
}

/// A session to one device.
///
/// Implementations deliver the command and return the device output once
/// the command has completed. Connection handling is entirely theirs.
#[async_trait]
pub trait Cli: Send + Sync {
    /// Sends a command and returns everything the device printed.
    async fn execute_and_read(&self, command: &Command) -> CliResult<String>;

    /// Sends a command, discarding the output.
    async fn execute(&self, command: &Command) -> CliResult<()> {
        self.execute_and_read(command).await.map(|_| ())
    }
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The stdout output.
    pub stdout: String,
    /// The stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a shell line asynchronously through `/bin/sh -c`.
pub async fn exec(line: &str) -> CliResult<ExecResult> {
    tracing::debug!(command = %line, "Executing shell command");

    let output = tokio::process::Command::new(SH_CMD)
        .arg("-c")
        .arg(line)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| CliError::Exec {
            command: line.to_string(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %line, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %line,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Transport that runs every command through a local program.
///
/// The command text is shell-quoted and appended to `prefix`, so a prefix
/// of `ssh admin@r1` runs `ssh admin@r1 "show running-config"`. With an
/// empty prefix the command itself is the shell line.
#[derive(Debug, Clone)]
pub struct ShellCli {
    prefix: String,
}

impl ShellCli {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Builds the shell line for a command.
    pub fn shell_line(&self, command: &Command) -> String {
        if self.prefix.trim().is_empty() {
            command.to_string()
        } else {
            format!("{} {}", self.prefix.trim(), shellquote(command.as_str()))
        }
    }
}

#[async_trait]
impl Cli for ShellCli {
    async fn execute_and_read(&self, command: &Command) -> CliResult<String> {
        let line = self.shell_line(command);
        let result = exec(&line).await?;
        if result.success() {
            Ok(result.stdout)
        } else {
            Err(CliError::CommandFailed {
                command: command.to_string(),
                exit_code: result.exit_code,
                output: result.combined_output(),
            })
        }
    }
}

/// Transport answering from captured device output.
///
/// Each command maps to one file in the capture directory, named by
/// [`ReplayCli::capture_name`]. A missing capture answers with empty output,
/// which readers treat like a device that has nothing configured. Every
/// command is recorded, so writes can be inspected afterwards.
#[derive(Debug)]
pub struct ReplayCli {
    dir: PathBuf,
    sent: Mutex<Vec<String>>,
}

impl ReplayCli {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name holding the output of `command`
    /// (`show running-config | include ^interface` -> `show_running_config_include_interface.txt`).
    pub fn capture_name(command: &Command) -> String {
        let name = CAPTURE_NAME_RE.replace_all(command.as_str().trim(), "_");
        format!("{}.txt", name.trim_matches('_'))
    }

    /// Commands received so far, in order.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Cli for ReplayCli {
    async fn execute_and_read(&self, command: &Command) -> CliResult<String> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(command.to_string());
        }

        let path = self.dir.join(Self::capture_name(command));
        match tokio::fs::read_to_string(&path).await {
            Ok(output) => Ok(output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(command = %command, path = %path.display(), "No capture, empty output");
                Ok(String::new())
            }
            Err(e) => Err(CliError::Replay {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }
}
