//! Common infrastructure for CLI translation units.
//!
//! A translation unit binds a vendor/OS to a set of handlers:
//!
//! - **readers** issue a show command over a [`Cli`] session and scrape the
//!   text into a model value with the helpers in [`parsing`];
//! - **writers** render a before/after pair of model values into vendor
//!   commands with the helpers in [`template`] and send them.
//!
//! Handlers are addressed by [`InstanceIdentifier`] and registered into a
//! [`HandlerRegistry`] by each [`TranslateUnit`].
//!
//! # Example
//!
//! ```ignore
//! use cliunit_common::{parsing, Command, ConfigReader, ReadContext};
//!
//! static MTU: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*mtu (?<mtu>\d+)$").unwrap());
//!
//! let output = handler::blocking_read(cli, id, &Command::new(SH_IFC), ctx).await?;
//! data.mtu = parsing::parse_field(&output, &MTU, |c| c["mtu"].parse().ok());
//! ```

pub mod cli;
pub mod context;
pub mod error;
pub mod handler;
pub mod iid;
pub mod parsing;
pub mod registry;
pub mod template;

// Re-export commonly used items at crate root
pub use cli::{Cli, Command, ReplayCli, ShellCli};
pub use context::{ReadContext, WriteContext};
pub use error::{CliError, CliResult, ReadError, ReadResult, WriteError, WriteResult};
pub use handler::{ConfigReader, ConfigWriter, ListReader};
pub use iid::InstanceIdentifier;
pub use registry::{DeviceId, HandlerRegistry, Modification, TranslateUnit};
