//! Test infrastructure for CLI translation units
//!
//! Provides:
//! - A scripted [`MockCli`] session that records what handlers send
//! - Fixtures for building modifications and write contexts
//! - Command verification helpers

pub mod fixtures;
mod mock;
mod verification;

pub use fixtures::*;
pub use mock::MockCli;
pub use verification::*;
