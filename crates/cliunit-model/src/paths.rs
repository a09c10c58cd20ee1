//! Identifiers of the model containers.
//!
//! Each container has a schema path constant (used to register handlers)
//! and a builder for a concrete identifier.

use cliunit_common::InstanceIdentifier;

pub const INTERFACES: &str = "/interfaces/interface";
pub const INTERFACE_CONFIG: &str = "/interfaces/interface/config";
pub const INTERFACE_IPV4: &str =
    "/interfaces/interface/subinterfaces/subinterface/ipv4/addresses";
pub const VLANS: &str = "/network-instances/network-instance/vlans/vlan";
pub const VLAN_CONFIG: &str = "/network-instances/network-instance/vlans/vlan/config";
pub const BGP_GLOBAL: &str =
    "/network-instances/network-instance/protocols/protocol/bgp/global/config";
pub const BGP_NEIGHBORS: &str =
    "/network-instances/network-instance/protocols/protocol/bgp/neighbors/neighbor";
pub const BGP_NEIGHBOR_CONFIG: &str =
    "/network-instances/network-instance/protocols/protocol/bgp/neighbors/neighbor/config";
pub const ACL_SETS: &str = "/acl/acl-sets/acl-set";
pub const ACL_SET_CONFIG: &str = "/acl/acl-sets/acl-set/config";
pub const ACL_ENTRIES: &str = "/acl/acl-sets/acl-set/acl-entries";
pub const TE_TUNNELS: &str =
    "/network-instances/network-instance/mpls/lsps/constrained-path/tunnels/tunnel";
pub const TE_TUNNEL_CONFIG: &str =
    "/network-instances/network-instance/mpls/lsps/constrained-path/tunnels/tunnel/config";
pub const CABLE_MACS: &str = "/cable/cable-macs/cable-mac";
pub const CABLE_MAC_CONFIG: &str = "/cable/cable-macs/cable-mac/config";
pub const CABLE_MAC_STATE: &str = "/cable/cable-macs/cable-mac/state";

/// Key of the BGP protocol entry.
pub const BGP_PROTOCOL: &str = "BGP";

fn network_instance(name: &str) -> InstanceIdentifier {
    InstanceIdentifier::new()
        .child("network-instances")
        .keyed("network-instance", name)
}

fn bgp(ni: &str) -> InstanceIdentifier {
    network_instance(ni)
        .child("protocols")
        .keyed("protocol", BGP_PROTOCOL)
        .child("bgp")
}

pub fn interfaces() -> InstanceIdentifier {
    InstanceIdentifier::new().child("interfaces").child("interface")
}

pub fn interface_config(name: &str) -> InstanceIdentifier {
    interfaces().with_last_key(name).child("config")
}

/// Addresses of subinterface 0, the interface itself on most vendors.
pub fn interface_ipv4(name: &str) -> InstanceIdentifier {
    subinterface_ipv4(name, 0)
}

pub fn subinterface_ipv4(name: &str, index: u32) -> InstanceIdentifier {
    interfaces()
        .with_last_key(name)
        .child("subinterfaces")
        .keyed("subinterface", index)
        .child("ipv4")
        .child("addresses")
}

pub fn vlans(ni: &str) -> InstanceIdentifier {
    network_instance(ni).child("vlans").child("vlan")
}

pub fn vlan_config(ni: &str, vlan_id: u16) -> InstanceIdentifier {
    vlans(ni).with_last_key(vlan_id).child("config")
}

pub fn bgp_global(ni: &str) -> InstanceIdentifier {
    bgp(ni).child("global").child("config")
}

pub fn bgp_neighbors(ni: &str) -> InstanceIdentifier {
    bgp(ni).child("neighbors").child("neighbor")
}

pub fn bgp_neighbor_config(ni: &str, address: &str) -> InstanceIdentifier {
    bgp_neighbors(ni).with_last_key(address).child("config")
}

pub fn acl_sets() -> InstanceIdentifier {
    InstanceIdentifier::new().child("acl").child("acl-sets").child("acl-set")
}

pub fn acl_set_config(name: &str) -> InstanceIdentifier {
    acl_sets().with_last_key(name).child("config")
}

pub fn acl_entries(name: &str) -> InstanceIdentifier {
    acl_sets().with_last_key(name).child("acl-entries")
}

pub fn te_tunnels(ni: &str) -> InstanceIdentifier {
    network_instance(ni)
        .child("mpls")
        .child("lsps")
        .child("constrained-path")
        .child("tunnels")
        .child("tunnel")
}

pub fn te_tunnel_config(ni: &str, name: &str) -> InstanceIdentifier {
    te_tunnels(ni).with_last_key(name).child("config")
}

pub fn cable_macs() -> InstanceIdentifier {
    InstanceIdentifier::new()
        .child("cable")
        .child("cable-macs")
        .child("cable-mac")
}

pub fn cable_mac_config(id: u32) -> InstanceIdentifier {
    cable_macs().with_last_key(id).child("config")
}

pub fn cable_mac_state(id: u32) -> InstanceIdentifier {
    cable_macs().with_last_key(id).child("state")
}
