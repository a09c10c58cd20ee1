//! Network primitives shared by the CLI translation units.
//!
//! Vendor CLIs print the same value in several shapes: an IPv4 address as
//! `A.B.C.D M.M.M.M` on IOS and `A.B.C.D/L` on Junos, an AS number plain or
//! in asdot, VLANs one per line or as `10,20-22`. These types accept every
//! shape a reader meets and print the canonical one.
//!
//! - [`IpPrefix`]: IP network prefixes, including dotted-mask input
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`AsNumber`]: 4-byte BGP autonomous system numbers

mod asn;
mod ip;
mod vlan;

pub use asn::AsNumber;
pub use ip::{mask_to_prefix_len, prefix_len_to_mask, IpPrefix};
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid netmask: {0}")]
    InvalidNetmask(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u32),

    #[error("invalid AS number: {0}")]
    InvalidAsNumber(String),
}
