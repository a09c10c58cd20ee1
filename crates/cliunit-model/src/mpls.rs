//! MPLS traffic-engineering tunnels.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// `/network-instances/.../mpls/lsps/constrained-path/tunnels/tunnel/config`
/// merged with the tunnel's bandwidth and shortcut settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TeTunnelConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub autoroute_announce: bool,
    /// Absolute IGP metric for the shortcut; only meaningful with autoroute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bandwidth_kbps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_priority: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_priority: Option<u8>,
}

impl TeTunnelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
