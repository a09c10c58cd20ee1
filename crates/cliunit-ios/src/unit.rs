use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use cliunit_common::handler::blocking_write_and_read;
use cliunit_common::{
    Cli, Command, DeviceId, HandlerRegistry, InstanceIdentifier, TranslateUnit, WriteResult,
};
use cliunit_model::paths;

use crate::acl::{AclEntriesReader, AclEntriesWriter, AclSetConfigReader, AclSetConfigWriter, AclSetReader};
use crate::bgp::{
    BgpGlobalConfigReader, BgpGlobalConfigWriter, BgpNeighborConfigReader,
    BgpNeighborConfigWriter, BgpNeighborReader,
};
use crate::interfaces::{InterfaceConfigReader, InterfaceConfigWriter, InterfaceReader};
use crate::ipv4::{Ipv4AddressReader, Ipv4AddressWriter};
use crate::mpls::{TeTunnelConfigReader, TeTunnelConfigWriter, TeTunnelReader};
use crate::vlan::{VlanConfigReader, VlanConfigWriter, VlanReader};

/// Lines IOS prints when it refuses a command.
static ERROR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"^% Invalid input", r"^% Incomplete command", r"^% Ambiguous command"]
        .iter()
        .map(|p| Regex::new(p).expect("Invalid regex pattern"))
        .collect()
});

/// Sends a rendered command block, failing on any IOS error line.
pub(crate) async fn send_config(
    cli: &dyn Cli,
    id: &InstanceIdentifier,
    commands: String,
) -> WriteResult<()> {
    blocking_write_and_read(cli, id, &Command::new(commands), IosUnit.error_patterns()).await?;
    Ok(())
}

/// Translation unit for Cisco IOS and IOS XE.
#[derive(Debug, Default, Clone, Copy)]
pub struct IosUnit;

impl IosUnit {
    pub fn new() -> Self {
        Self
    }
}

impl TranslateUnit for IosUnit {
    fn name(&self) -> &str {
        "ios"
    }

    fn supports(&self, device: &DeviceId) -> bool {
        let vendor = device.vendor.to_ascii_lowercase();
        vendor == "ios" || vendor == "ios-xe" || vendor == "cisco"
    }

    fn error_patterns(&self) -> &[Regex] {
        &ERROR_PATTERNS
    }

    fn provide_handlers(&self, registry: &mut HandlerRegistry, cli: Arc<dyn Cli>) {
        registry.add_list_reader(paths::INTERFACES, InterfaceReader::new(cli.clone()));
        registry.add_reader(paths::INTERFACE_CONFIG, InterfaceConfigReader::new(cli.clone()));
        registry.add_reader(paths::INTERFACE_IPV4, Ipv4AddressReader::new(cli.clone()));
        registry.add_list_reader(paths::VLANS, VlanReader::new(cli.clone()));
        registry.add_reader(paths::VLAN_CONFIG, VlanConfigReader::new(cli.clone()));
        registry.add_reader(paths::BGP_GLOBAL, BgpGlobalConfigReader::new(cli.clone()));
        registry.add_list_reader(paths::BGP_NEIGHBORS, BgpNeighborReader::new(cli.clone()));
        registry.add_reader(paths::BGP_NEIGHBOR_CONFIG, BgpNeighborConfigReader::new(cli.clone()));
        registry.add_list_reader(paths::ACL_SETS, AclSetReader::new(cli.clone()));
        registry.add_reader(paths::ACL_SET_CONFIG, AclSetConfigReader::new(cli.clone()));
        registry.add_reader(paths::ACL_ENTRIES, AclEntriesReader::new(cli.clone()));
        registry.add_list_reader(paths::TE_TUNNELS, TeTunnelReader::new(cli.clone()));
        registry.add_reader(paths::TE_TUNNEL_CONFIG, TeTunnelConfigReader::new(cli.clone()));

        // Parents before children: deletes run in reverse.
        registry.add_writer(paths::INTERFACE_CONFIG, InterfaceConfigWriter::new(cli.clone()));
        registry.add_writer(paths::INTERFACE_IPV4, Ipv4AddressWriter::new(cli.clone()));
        registry.add_writer(paths::VLAN_CONFIG, VlanConfigWriter::new(cli.clone()));
        registry.add_writer(paths::BGP_GLOBAL, BgpGlobalConfigWriter::new(cli.clone()));
        registry.add_writer(paths::BGP_NEIGHBOR_CONFIG, BgpNeighborConfigWriter::new(cli.clone()));
        registry.add_writer(paths::ACL_SET_CONFIG, AclSetConfigWriter::new(cli.clone()));
        registry.add_writer(paths::ACL_ENTRIES, AclEntriesWriter::new(cli.clone()));
        registry.add_writer(paths::TE_TUNNEL_CONFIG, TeTunnelConfigWriter::new(cli));
    }
}
