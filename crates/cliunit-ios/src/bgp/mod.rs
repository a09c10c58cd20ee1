//! BGP global config and neighbors.
//!
//! IOS runs a single `router bgp AS` process; VRFs live under
//! `address-family ipv4 vrf NAME` blocks inside it. Lines are attributed
//! to a network instance by the nearest preceding address-family header.

mod global;
mod neighbor;

pub use global::*;
pub use neighbor::*;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use cliunit_common::{InstanceIdentifier, ReadError, ReadResult};
use cliunit_model::DEFAULT_NETWORK_INSTANCE;

pub const SH_BGP: &str = "show running-config | section ^router bgp";

static ROUTER_BGP_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^router bgp (?<as>\S+)$").expect("Invalid regex pattern"));
static ADDRESS_FAMILY_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*address-family ipv[46](?: unicast| multicast)?(?: vrf (?<vrf>\S+))?$")
        .expect("Invalid regex pattern")
});

/// Network instance of an address-family header; no header or no `vrf`
/// keyword means the default instance.
fn instance_of<'a>(header: Option<&'a Captures<'_>>) -> &'a str {
    header
        .and_then(|h| h.name("vrf"))
        .map_or(DEFAULT_NETWORK_INSTANCE, |m| m.as_str())
}

fn network_instance_key(id: &InstanceIdentifier) -> ReadResult<&str> {
    id.key_of("network-instance")
        .ok_or_else(|| ReadError::unsupported(id))
}

/// The VRF name for templates, `None` in the default instance.
fn vrf_name(network_instance: &str) -> Option<&str> {
    (network_instance != DEFAULT_NETWORK_INSTANCE).then_some(network_instance)
}
