//! Interface configuration.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// IANA interface type, as used by `openconfig-interfaces`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterfaceType {
    EthernetCsmacd,
    SoftwareLoopback,
    Ieee8023adLag,
    L3ipvlan,
    Tunnel,
    DocsCableMaclayer,
    Other,
}

impl InterfaceType {
    /// Classifies an interface by its vendor name prefix.
    ///
    /// Covers the IOS long names, the Junos `xe-`/`ge-` names and the CMTS
    /// `cable-mac` interfaces; anything else is [`InterfaceType::Other`].
    pub fn from_name(name: &str) -> Self {
        const TABLE: &[(&str, InterfaceType)] = &[
            ("GigabitEthernet", InterfaceType::EthernetCsmacd),
            ("TenGigabitEthernet", InterfaceType::EthernetCsmacd),
            ("FastEthernet", InterfaceType::EthernetCsmacd),
            ("Ethernet", InterfaceType::EthernetCsmacd),
            ("ge-", InterfaceType::EthernetCsmacd),
            ("xe-", InterfaceType::EthernetCsmacd),
            ("et-", InterfaceType::EthernetCsmacd),
            ("Loopback", InterfaceType::SoftwareLoopback),
            ("lo", InterfaceType::SoftwareLoopback),
            ("Port-channel", InterfaceType::Ieee8023adLag),
            ("ae", InterfaceType::Ieee8023adLag),
            ("Vlan", InterfaceType::L3ipvlan),
            ("irb", InterfaceType::L3ipvlan),
            ("Tunnel", InterfaceType::Tunnel),
            ("cable-mac", InterfaceType::DocsCableMaclayer),
        ];

        TABLE
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix))
            .map(|(_, ty)| *ty)
            .unwrap_or(InterfaceType::Other)
    }

    /// Virtual interfaces can be created and removed by configuration.
    pub fn is_virtual(&self) -> bool {
        !matches!(
            self,
            InterfaceType::EthernetCsmacd | InterfaceType::DocsCableMaclayer | InterfaceType::Other
        )
    }
}

/// `/interfaces/interface/config`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub if_type: Option<InterfaceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl InterfaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// `/interfaces/interface/subinterfaces/subinterface/ipv4/addresses/address/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4AddressConfig {
    pub ip: Ipv4Addr,
    pub prefix_length: u8,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secondary: bool,
}

/// All IPv4 addresses of a subinterface, primary first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ipv4Addresses {
    #[serde(default)]
    pub address: Vec<Ipv4AddressConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_type_from_name() {
        assert_eq!(
            InterfaceType::from_name("GigabitEthernet0/1"),
            InterfaceType::EthernetCsmacd
        );
        assert_eq!(
            InterfaceType::from_name("Loopback0"),
            InterfaceType::SoftwareLoopback
        );
        assert_eq!(InterfaceType::from_name("ae3"), InterfaceType::Ieee8023adLag);
        assert_eq!(InterfaceType::from_name("Tunnel10"), InterfaceType::Tunnel);
        assert_eq!(
            InterfaceType::from_name("cable-mac 1"),
            InterfaceType::DocsCableMaclayer
        );
        assert_eq!(InterfaceType::from_name("Null0"), InterfaceType::Other);
    }

    #[test]
    fn test_virtual() {
        assert!(InterfaceType::SoftwareLoopback.is_virtual());
        assert!(InterfaceType::Tunnel.is_virtual());
        assert!(!InterfaceType::EthernetCsmacd.is_virtual());
    }

    #[test]
    fn test_config_serialization_skips_unset() {
        let config = InterfaceConfig {
            mtu: Some(1500),
            ..InterfaceConfig::new("Loopback0")
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Loopback0", "mtu": 1500}));

        let back: InterfaceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
