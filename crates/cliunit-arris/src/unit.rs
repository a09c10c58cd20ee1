use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_write_and_read;
use cliunit_common::{
    Cli, Command, DeviceId, HandlerRegistry, InstanceIdentifier, TranslateUnit, WriteResult,
};
use cliunit_model::paths;

use crate::cable_mac::{CableMacConfigReader, CableMacConfigWriter, CableMacReader};
use crate::state::CableMacStateReader;

static ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^% Invalid", r"^% Error", r"^Error:"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex pattern"))
        .collect()
});

pub(crate) async fn send_config(
    cli: &dyn Cli,
    id: &InstanceIdentifier,
    commands: String,
) -> WriteResult<()> {
    blocking_write_and_read(cli, id, &Command::new(commands), ArrisUnit.error_patterns()).await?;
    Ok(())
}

/// Translation unit for the Arris E6000.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArrisUnit;

impl ArrisUnit {
    pub fn new() -> Self {
        Self
    }
}

impl TranslateUnit for ArrisUnit {
    fn name(&self) -> &str {
        "arris"
    }

    fn supports(&self, device: &DeviceId) -> bool {
        device.vendor.eq_ignore_ascii_case("arris")
    }

    fn error_patterns(&self) -> &[Regex] {
        &ERROR_PATTERNS
    }

    fn provide_handlers(&self, registry: &mut HandlerRegistry, cli: Arc<dyn Cli>) {
        registry.add_list_reader(paths::CABLE_MACS, CableMacReader::new(cli.clone()));
        registry.add_reader(paths::CABLE_MAC_CONFIG, CableMacConfigReader::new(cli.clone()));
        registry.add_reader(paths::CABLE_MAC_STATE, CableMacStateReader::new(cli.clone()));

        registry.add_writer(paths::CABLE_MAC_CONFIG, CableMacConfigWriter::new(cli));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports() {
        assert!(ArrisUnit.supports(&DeviceId::new("Arris", "9.1")));
        assert!(!ArrisUnit.supports(&DeviceId::new("ios", "15.2")));
    }
}
