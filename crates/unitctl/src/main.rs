//! unitctl: drive a translation unit from the command line.
//!
//! ```text
//! unitctl --device r1.yaml units
//! unitctl --device r1.yaml read '/interfaces/interface[Loopback0]/config'
//! unitctl --device r1.yaml apply '/interfaces/interface[Loopback0]/config' --after lo0.json
//! ```

mod config;
mod units;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use cliunit_common::{
    HandlerRegistry, InstanceIdentifier, Modification, ReadContext, ReadError, ReplayCli,
    WriteContext,
};

use crate::config::DeviceFile;

/// Reads and writes device configuration through CLI translation units
#[derive(Parser, Debug)]
#[command(name = "unitctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Device file (YAML)
    #[arg(short = 'd', long, global = true)]
    device: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the known units and the paths they handle
    Units,

    /// Read a container or list and print it as JSON
    Read {
        /// Instance identifier, e.g. /interfaces/interface[Loopback0]/config
        path: String,
    },

    /// Render and send the commands for a change
    Apply {
        /// Instance identifier of the changed container
        path: String,

        /// JSON file with the current value (omit to create)
        #[arg(long)]
        before: Option<PathBuf>,

        /// JSON file with the new value (omit to delete)
        #[arg(long)]
        after: Option<PathBuf>,

        /// JSON file mapping identifiers to `{before, after}` of related data
        #[arg(long)]
        context: Option<PathBuf>,
    },
}

/// Related data a writer may consult, keyed by identifier.
#[derive(Debug, Default, Deserialize)]
struct ContextEntry {
    #[serde(default)]
    before: Option<Value>,
    #[serde(default)]
    after: Option<Value>,
}

fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_path(path: &str) -> Result<InstanceIdentifier> {
    Ok(path.parse::<InstanceIdentifier>()?)
}

/// Builds the modification for a before/after pair.
fn modification(
    id: InstanceIdentifier,
    before: Option<Value>,
    after: Option<Value>,
) -> Result<Modification> {
    Ok(match (before, after) {
        (None, Some(after)) => Modification::create(id, after),
        (Some(before), Some(after)) => Modification::update(id, before, after),
        (Some(before), None) => Modification::delete(id, before),
        (None, None) => bail!("apply needs --before, --after or both"),
    })
}

fn write_context(
    modification: &Modification,
    related: HashMap<String, ContextEntry>,
) -> Result<WriteContext> {
    let mut ctx = WriteContext::new();
    for (path, entry) in related {
        let id = parse_path(&path)?;
        if let Some(before) = &entry.before {
            ctx = ctx.with_before(&id, before);
        }
        if let Some(after) = &entry.after {
            ctx = ctx.with_after(&id, after);
        }
    }
    if let Some(before) = &modification.before {
        ctx = ctx.with_before(&modification.id, before);
    }
    if let Some(after) = &modification.after {
        ctx = ctx.with_after(&modification.id, after);
    }
    Ok(ctx)
}

fn connect(device_path: &Path) -> Result<HandlerRegistry> {
    let file = DeviceFile::load(device_path)?;
    let unit = units::find(&file.device.id()).ok_or_else(|| {
        anyhow!(
            "no unit supports vendor '{}' version '{}'",
            file.device.vendor,
            file.device.version
        )
    })?;
    let base = device_path.parent().unwrap_or_else(|| Path::new("."));
    let cli = file.connect(base)?;

    info!(device = %file.device.name, unit = unit.name(), "Connected");
    Ok(HandlerRegistry::for_unit(unit.as_ref(), cli))
}

async fn run(args: Args) -> Result<()> {
    // Listing only registers handlers; nothing is sent.
    if let Commands::Units = args.command {
        for unit in units::catalog() {
            println!("{}", unit.name());
            let registry = HandlerRegistry::for_unit(
                unit.as_ref(),
                Arc::new(ReplayCli::new(".")),
            );
            for path in registry.supported_paths() {
                println!("  {}", path);
            }
        }
        return Ok(());
    }

    let device = args.device.context("--device is required")?;
    let registry = connect(&device)?;

    match args.command {
        Commands::Units => Ok(()),
        Commands::Read { path } => {
            let id = parse_path(&path)?;
            let ctx = ReadContext::new();
            let value = match registry.read(&id, &ctx).await {
                Err(ReadError::Unsupported { .. }) => {
                    serde_json::to_value(registry.read_ids(&id, &ctx).await?)?
                }
                other => other?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Commands::Apply {
            path,
            before,
            after,
            context,
        } => {
            let id = parse_path(&path)?;
            let before = before.as_deref().map(read_json).transpose()?;
            let after = after.as_deref().map(read_json).transpose()?;
            let related: HashMap<String, ContextEntry> = match context.as_deref() {
                Some(path) => serde_json::from_value(read_json(path)?)
                    .with_context(|| format!("Invalid context file {}", path.display()))?,
                None => HashMap::new(),
            };

            let modification = modification(id, before, after)?;
            let ctx = write_context(&modification, related)?;
            registry.apply(vec![modification], &ctx).await?;
            info!(path = %path, "Applied");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("unitctl failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn id() -> InstanceIdentifier {
        parse_path("/interfaces/interface[Loopback0]/config").unwrap()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "unitctl",
            "--device",
            "r1.yaml",
            "apply",
            "/interfaces/interface[Loopback0]/config",
            "--after",
            "lo0.json",
        ])
        .unwrap();

        assert_eq!(args.device, Some(PathBuf::from("r1.yaml")));
        assert_eq!(args.log_level, "info");
        assert!(matches!(
            args.command,
            Commands::Apply { before: None, after: Some(_), .. }
        ));
    }

    #[test]
    fn test_modification_kinds() {
        let data = json!({"name": "Loopback0"});

        let create = modification(id(), None, Some(data.clone())).unwrap();
        assert_eq!(create, Modification::create(id(), data.clone()));

        let delete = modification(id(), Some(data.clone()), None).unwrap();
        assert_eq!(delete.after, None);

        assert!(modification(id(), None, None).is_err());
    }

    #[test]
    fn test_write_context_includes_related_data() {
        let global = "/network-instances/network-instance[default]/protocols/protocol[BGP]/bgp/global/config";
        let related = HashMap::from([(
            global.to_string(),
            ContextEntry {
                before: None,
                after: Some(json!({"as": 65000})),
            },
        )]);
        let m = Modification::create(id(), json!({"name": "Loopback0"}));

        let ctx = write_context(&m, related).unwrap();
        assert_eq!(
            ctx.read_after::<Value>(&parse_path(global).unwrap()),
            Some(json!({"as": 65000}))
        );
        assert_eq!(ctx.read_after::<Value>(&id()), Some(json!({"name": "Loopback0"})));
        assert_eq!(ctx.read_before::<Value>(&id()), None);
    }

    #[test]
    fn test_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lo0.json");
        std::fs::write(&path, r#"{"name": "Loopback0", "mtu": 1500}"#).unwrap();
        assert_eq!(read_json(&path).unwrap()["mtu"], 1500);

        std::fs::write(&path, "not json").unwrap();
        assert!(read_json(&path).is_err());
    }
}
