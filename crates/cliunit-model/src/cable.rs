//! DOCSIS cable-mac interfaces on a CMTS.

use crate::Status;
use serde::{Deserialize, Serialize};

/// Configuration of a `cable-mac N` interface.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CableMacConfig {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// One row of the downstream channel table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownstreamChannel {
    /// `slot/port/channel`
    pub id: String,
    pub admin_status: Option<Status>,
    pub oper_status: Option<Status>,
    pub frequency_hz: Option<u64>,
    pub power_dbmv: Option<f64>,
    pub modulation: Option<String>,
}

/// One row of the upstream channel table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamChannel {
    /// `slot/port/channel`
    pub id: String,
    pub admin_status: Option<Status>,
    pub oper_status: Option<Status>,
    pub frequency_hz: Option<u64>,
    pub width_hz: Option<u64>,
}

/// Operational state of a cable-mac interface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CableMacState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oper_status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modems_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modems_online: Option<u32>,
    #[serde(default)]
    pub downstream: Vec<DownstreamChannel>,
    #[serde(default)]
    pub upstream: Vec<UpstreamChannel>,
}
