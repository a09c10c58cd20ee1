//! VLAN configuration.

use cliunit_types::VlanId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VlanStatus {
    Active,
    Suspended,
}

/// `/network-instances/network-instance/vlans/vlan/config`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanConfig {
    pub vlan_id: VlanId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<VlanStatus>,
}

impl Default for VlanConfig {
    fn default() -> Self {
        Self::new(VlanId::DEFAULT)
    }
}

impl VlanConfig {
    pub fn new(vlan_id: VlanId) -> Self {
        Self {
            vlan_id,
            name: None,
            status: None,
        }
    }
}
