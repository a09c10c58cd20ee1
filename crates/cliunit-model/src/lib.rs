//! Vendor-neutral configuration model.
//!
//! The types mirror the OpenConfig containers the translation units read
//! and write. Every leaf is optional: a reader that finds nothing for a
//! field leaves it unset, and a writer only renders what is present.
//!
//! | Module | OpenConfig subtree |
//! |--------|--------------------|
//! | [`interfaces`] | `/interfaces/interface/config`, `.../ipv4/addresses` |
//! | [`vlan`] | `/network-instances/network-instance/vlans` |
//! | [`bgp`] | `/network-instances/.../protocols/protocol/bgp` |
//! | [`acl`] | `/acl/acl-sets` |
//! | [`mpls`] | `/network-instances/.../mpls/lsps/constrained-path/tunnels` |
//! | [`cable`] | DOCSIS cable-mac interfaces (vendor extension) |
//!
//! [`paths`] builds the identifiers handlers are registered and called on.

pub mod acl;
pub mod bgp;
pub mod cable;
pub mod interfaces;
pub mod mpls;
pub mod paths;
pub mod vlan;

/// Name of the default network instance.
pub const DEFAULT_NETWORK_INSTANCE: &str = "default";

/// Administrative/operational status shared by several containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    /// Parses the `up`/`down` words vendors print, case-insensitively.
    pub fn from_word(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("up") {
            Some(Status::Up)
        } else if word.eq_ignore_ascii_case("down") {
            Some(Status::Down)
        } else {
            None
        }
    }
}
