//! Reader and writer handler traits.
//!
//! Every handler is stateless apart from the [`Cli`] session it was built
//! with. A reader fills a value from show output; a writer turns a value
//! (or a before/after pair) into commands.

use async_trait::async_trait;
use regex::Regex;
use std::fmt;
use tracing::{debug, warn};

use crate::cli::{Cli, Command};
use crate::context::{ReadContext, WriteContext};
use crate::error::{ReadError, ReadResult, WriteError, WriteResult};
use crate::iid::InstanceIdentifier;
use crate::parsing;

/// Reads a single container.
///
/// The registry creates `Data` with `Default`; the reader sets the key
/// fields from the identifier and whatever it can parse.
#[async_trait]
pub trait ConfigReader: Send + Sync {
    /// The container this reader populates.
    type Data: Send;

    async fn read_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &mut Self::Data,
        ctx: &ReadContext,
    ) -> ReadResult<()>;
}

/// Reads the keys of a list.
#[async_trait]
pub trait ListReader: Send + Sync {
    /// The list key, rendered with `Display` into identifiers.
    type Key: fmt::Display + Send;

    async fn get_all_ids(
        &self,
        id: &InstanceIdentifier,
        ctx: &ReadContext,
    ) -> ReadResult<Vec<Self::Key>>;
}

/// Writes a single container.
#[async_trait]
pub trait ConfigWriter: Send + Sync {
    /// The container this writer renders.
    type Data: Send + Sync;

    async fn write_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &Self::Data,
        ctx: &WriteContext,
    ) -> WriteResult<()>;

    /// Applies a change. Writers whose templates diff `before` against
    /// `data` override this; the default removes the old value and writes
    /// the new one.
    async fn update_current_attributes(
        &self,
        id: &InstanceIdentifier,
        before: &Self::Data,
        after: &Self::Data,
        ctx: &WriteContext,
    ) -> WriteResult<()> {
        self.delete_current_attributes(id, before, ctx).await?;
        self.write_current_attributes(id, after, ctx).await
    }

    async fn delete_current_attributes(
        &self,
        id: &InstanceIdentifier,
        data: &Self::Data,
        ctx: &WriteContext,
    ) -> WriteResult<()>;
}

/// Runs a show command, reusing the transaction cache.
pub async fn blocking_read(
    cli: &dyn Cli,
    id: &InstanceIdentifier,
    command: &Command,
    ctx: &ReadContext,
) -> ReadResult<String> {
    if let Some(output) = ctx.cached(command.as_str()) {
        debug!(command = %command, "Using cached output");
        return Ok(output);
    }

    debug!(command = %command, path = %id, "Reading from device");
    let output = cli
        .execute_and_read(command)
        .await
        .map_err(|e| ReadError::failed(id, e))?;
    ctx.store(command.as_str(), &output);
    Ok(output)
}

/// Sends configuration commands and checks the echo for device errors.
///
/// An empty command is not sent. Any output line matching one of the
/// unit's `error_patterns` fails the write with
/// [`WriteError::DeviceRejected`].
pub async fn blocking_write_and_read(
    cli: &dyn Cli,
    id: &InstanceIdentifier,
    command: &Command,
    error_patterns: &[Regex],
) -> WriteResult<String> {
    if command.is_empty() {
        debug!(path = %id, "Nothing to send");
        return Ok(String::new());
    }

    debug!(path = %id, command = %command, "Sending configuration");
    let output = cli
        .execute_and_read(command)
        .await
        .map_err(|e| WriteError::Cli {
            path: id.to_string(),
            source: e,
        })?;

    if let Some(line) = parsing::lines(&output)
        .find(|line| error_patterns.iter().any(|p| p.is_match(line.trim_start())))
    {
        warn!(path = %id, error = %line, "Device rejected configuration");
        return Err(WriteError::DeviceRejected {
            path: id.to_string(),
            command: command.to_string(),
            output: output.clone(),
        });
    }

    Ok(output)
}
