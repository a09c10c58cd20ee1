//! BGP global and neighbor configuration.
//!
//! The network instance a neighbor belongs to is not part of these values;
//! it is the `network-instance` key of the identifier the handler is called
//! with.

use cliunit_types::AsNumber;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

/// `/network-instances/network-instance/protocols/protocol/bgp/global/config`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BgpGlobalConfig {
    #[serde(rename = "as", default, skip_serializing_if = "Option::is_none")]
    pub as_number: Option<AsNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router_id: Option<Ipv4Addr>,
}

/// Community attributes sent to a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CommunityType {
    Standard,
    Extended,
    Both,
}

/// `/network-instances/.../bgp/neighbors/neighbor/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BgpNeighborConfig {
    pub neighbor_address: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_as: Option<AsNumber>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_community: Option<CommunityType>,
}

impl Default for BgpNeighborConfig {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    }
}

impl BgpNeighborConfig {
    pub fn new(neighbor_address: IpAddr) -> Self {
        Self {
            neighbor_address,
            peer_as: None,
            description: None,
            enabled: None,
            peer_group: None,
            send_community: None,
        }
    }
}
