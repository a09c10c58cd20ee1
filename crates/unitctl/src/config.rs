//! Device file loading.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cliunit_common::{Cli, DeviceId, ReplayCli, ShellCli};

/// Contents of a device file.
///
/// ```yaml
/// device: { name: r1, vendor: ios, version: "15.2" }
/// transport:
///   kind: shell
///   prefix: "ssh admin@r1"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceFile {
    pub device: Device,
    pub transport: Transport,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Device {
    pub name: String,
    pub vendor: String,
    #[serde(default)]
    pub version: String,
}

impl Device {
    pub fn id(&self) -> DeviceId {
        DeviceId::new(&self.vendor, &self.version)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Shell,
    Replay,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transport {
    pub kind: TransportKind,
    /// Shell command the device command is appended to, e.g. `ssh admin@r1`.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Directory of captured outputs.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl DeviceFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read device file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid device file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: DeviceFile = serde_yaml::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        match self.transport.kind {
            TransportKind::Shell if self.transport.prefix.is_none() => {
                bail!("shell transport needs a prefix")
            }
            TransportKind::Replay if self.transport.dir.is_none() => {
                bail!("replay transport needs a dir")
            }
            _ => Ok(()),
        }
    }

    /// Opens the session described by `transport`. Relative replay
    /// directories resolve against `base`, the device file's directory.
    pub fn connect(&self, base: &Path) -> Result<Arc<dyn Cli>> {
        match (&self.transport.kind, &self.transport.prefix, &self.transport.dir) {
            (TransportKind::Shell, Some(prefix), _) => Ok(Arc::new(ShellCli::new(prefix.clone()))),
            (TransportKind::Replay, _, Some(dir)) => Ok(Arc::new(ReplayCli::new(base.join(dir)))),
            _ => bail!("incomplete transport for device {}", self.device.name),
        }
    }
}
