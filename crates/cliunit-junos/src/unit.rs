use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_write_and_read;
use cliunit_common::{
    parsing, Cli, Command, DeviceId, HandlerRegistry, InstanceIdentifier, TranslateUnit,
    WriteResult,
};
use cliunit_model::paths;

use crate::interfaces::{InterfaceConfigReader, InterfaceConfigWriter, InterfaceReader};
use crate::ipv4::{Ipv4AddressReader, Ipv4AddressWriter};

pub const SH_INTERFACES: &str = "show configuration interfaces | display set";

/// Lines Junos prints when it refuses a statement or a commit.
static ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^error:", r"^syntax error", r"^unknown command"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex pattern"))
        .collect()
});

/// Statements under `prefix`, with the prefix removed.
pub(crate) fn statements_under(output: &str, prefix: &str) -> String {
    let prefix = format!("{} ", prefix);
    parsing::lines(output)
        .filter_map(|line| line.strip_prefix(prefix.as_str()))
        .join("\n")
}

pub(crate) async fn send_config(
    cli: &dyn Cli,
    id: &InstanceIdentifier,
    commands: String,
) -> WriteResult<()> {
    blocking_write_and_read(cli, id, &Command::new(commands), JunosUnit.error_patterns()).await?;
    Ok(())
}

/// Translation unit for Junos.
#[derive(Debug, Default, Clone, Copy)]
pub struct JunosUnit;

impl JunosUnit {
    pub fn new() -> Self {
        Self
    }
}

impl TranslateUnit for JunosUnit {
    fn name(&self) -> &str {
        "junos"
    }

    fn supports(&self, device: &DeviceId) -> bool {
        device.vendor.eq_ignore_ascii_case("junos")
    }

    fn error_patterns(&self) -> &[Regex] {
        &ERROR_PATTERNS
    }

    fn provide_handlers(&self, registry: &mut HandlerRegistry, cli: Arc<dyn Cli>) {
        registry.add_list_reader(paths::INTERFACES, InterfaceReader::new(cli.clone()));
        registry.add_reader(paths::INTERFACE_CONFIG, InterfaceConfigReader::new(cli.clone()));
        registry.add_reader(paths::INTERFACE_IPV4, Ipv4AddressReader::new(cli.clone()));

        registry.add_writer(paths::INTERFACE_CONFIG, InterfaceConfigWriter::new(cli.clone()));
        registry.add_writer(paths::INTERFACE_IPV4, Ipv4AddressWriter::new(cli));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_statements_under() {
        let output = "\
set interfaces ge-0/0/0 description uplink
set interfaces ge-0/0/0 mtu 9192
set interfaces ge-0/0/1 disable
set interfaces ge-0/0/10 mtu 1500
";
        assert_eq!(
            statements_under(output, "set interfaces ge-0/0/0"),
            "description uplink\nmtu 9192"
        );
    }

    #[test]
    fn test_error_patterns() {
        let matches = |line: &str| ERROR_PATTERNS.iter().any(|p| p.is_match(line));
        assert!(matches("error: configuration check-out failed"));
        assert!(matches("syntax error, expecting <command>."));
        assert!(!matches("commit complete"));
    }

    #[test]
    fn test_supports() {
        assert!(JunosUnit.supports(&DeviceId::new("Junos", "18.4")));
        assert!(!JunosUnit.supports(&DeviceId::new("ios", "15.2")));
    }
}
