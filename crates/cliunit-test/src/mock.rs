//! Scripted CLI session.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

use cliunit_common::{Cli, CliError, CliResult, Command};

/// A [`Cli`] answering from canned output.
///
/// Commands without canned output return an empty string, which is what a
/// device echoes for accepted configuration. Every command is recorded,
/// whether it succeeds or not.
#[derive(Debug, Default)]
pub struct MockCli {
    outputs: HashMap<String, String>,
    failures: HashMap<String, (i32, String)>,
    sent: Mutex<Vec<String>>,
}

impl MockCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `command` with `output`.
    pub fn with_output(mut self, command: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.insert(command.into(), output.into());
        self
    }

    /// Fails `command` with [`CliError::CommandFailed`].
    pub fn with_failure(
        mut self,
        command: impl Into<String>,
        exit_code: i32,
        output: impl Into<String>,
    ) -> Self {
        self.failures.insert(command.into(), (exit_code, output.into()));
        self
    }

    /// Commands received so far, oldest first.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Forgets the recorded commands.
    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.clear();
        }
    }
}

#[async_trait]
impl Cli for MockCli {
    async fn execute_and_read(&self, command: &Command) -> CliResult<String> {
        debug!(command = %command, "[MOCK] Received command");
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(command.as_str().to_string());
        }

        if let Some((exit_code, output)) = self.failures.get(command.as_str()) {
            return Err(CliError::command_failed(command.as_str(), *exit_code, output.clone()));
        }
        Ok(self
            .outputs
            .get(command.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
