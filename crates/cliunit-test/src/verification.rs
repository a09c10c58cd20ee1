//! Verification helpers for testing translation units
//!
//! Provides assertion helpers over the commands a [`MockCli`] received.

use thiserror::Error;

use crate::MockCli;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Expected command was not sent:\n{command}")]
    CommandNotSent { command: String },

    #[error("Unexpected command was sent:\n{command}")]
    UnexpectedCommand { command: String },

    #[error("Expected {expected} commands, {actual} were sent")]
    CommandCountMismatch { expected: usize, actual: usize },

    #[error("Command {index} mismatch:\nexpected:\n{expected}\nactual:\n{actual}")]
    CommandMismatch {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Checks the commands recorded by a [`MockCli`].
pub struct CommandVerifier<'a> {
    cli: &'a MockCli,
}

impl<'a> CommandVerifier<'a> {
    pub fn new(cli: &'a MockCli) -> Self {
        Self { cli }
    }

    /// Verify that `command` was sent at least once
    pub fn assert_sent(&self, command: &str) -> VerifyResult<()> {
        if self.cli.sent_commands().iter().any(|sent| sent == command) {
            return Ok(());
        }
        Err(VerificationError::CommandNotSent {
            command: command.to_string(),
        })
    }

    /// Verify that `command` was never sent
    pub fn assert_not_sent(&self, command: &str) -> VerifyResult<()> {
        if self.cli.sent_commands().iter().any(|sent| sent == command) {
            return Err(VerificationError::UnexpectedCommand {
                command: command.to_string(),
            });
        }
        Ok(())
    }

    /// Verify that some configuration block contained `line`
    pub fn assert_line_sent(&self, line: &str) -> VerifyResult<()> {
        let sent = self
            .cli
            .sent_commands()
            .iter()
            .any(|block| block.lines().any(|l| l.trim() == line));
        if sent {
            return Ok(());
        }
        Err(VerificationError::CommandNotSent {
            command: line.to_string(),
        })
    }

    /// Verify the exact sequence of commands
    pub fn assert_sequence(&self, expected: &[&str]) -> VerifyResult<()> {
        let sent = self.cli.sent_commands();
        if sent.len() != expected.len() {
            return Err(VerificationError::CommandCountMismatch {
                expected: expected.len(),
                actual: sent.len(),
            });
        }
        for (index, (actual, expected)) in sent.iter().zip(expected).enumerate() {
            if actual != expected {
                return Err(VerificationError::CommandMismatch {
                    index,
                    expected: expected.to_string(),
                    actual: actual.clone(),
                });
            }
        }
        Ok(())
    }

    /// Verify that nothing was sent
    pub fn assert_nothing_sent(&self) -> VerifyResult<()> {
        self.assert_sequence(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliunit_common::{Cli, Command};

    #[tokio::test]
    async fn test_verifier() {
        let cli = MockCli::new();
        cli.execute_and_read(&Command::new("show running-config"))
            .await
            .unwrap();
        cli.execute_and_read(&Command::new("configure terminal\nend\n"))
            .await
            .unwrap();

        let verifier = CommandVerifier::new(&cli);
        verifier.assert_sent("show running-config").unwrap();
        verifier.assert_not_sent("write memory").unwrap();
        verifier.assert_line_sent("end").unwrap();
        assert!(verifier.assert_line_sent("interface Loopback0").is_err());
        verifier
            .assert_sequence(&["show running-config", "configure terminal\nend\n"])
            .unwrap();

        assert!(matches!(
            verifier.assert_nothing_sent(),
            Err(VerificationError::CommandCountMismatch { expected: 0, actual: 2 })
        ));
        assert!(matches!(
            verifier.assert_sequence(&["show version", "end"]),
            Err(VerificationError::CommandMismatch { index: 0, .. })
        ));
    }
}
