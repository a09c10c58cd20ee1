//! Cisco IOS translation unit
//!
//! Reads `show running-config` sections into the configuration model and
//! renders model changes into `configure terminal` command blocks.
//!
//! | Module | Containers |
//! |--------|------------|
//! | [`interfaces`] | interface list and config |
//! | [`ipv4`] | interface IPv4 addresses |
//! | [`vlan`] | VLAN list and config |
//! | [`bgp`] | BGP global config, neighbors per VRF |
//! | [`acl`] | extended IPv4 access lists |
//! | [`mpls`] | MPLS-TE tunnel interfaces |

pub mod acl;
pub mod bgp;
pub mod interfaces;
pub mod ipv4;
pub mod mpls;
mod unit;
pub mod vlan;

pub use unit::IosUnit;
