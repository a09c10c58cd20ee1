//! Access control lists.

use cliunit_types::IpPrefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AclType {
    #[default]
    AclIpv4,
    AclIpv6,
}

/// `/acl/acl-sets/acl-set/config`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AclSetConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub acl_type: AclType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ForwardingAction {
    Accept,
    Drop,
}

/// IP protocol matched by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    /// Any IP protocol.
    Ip,
    Tcp,
    Udp,
    Icmp,
    Number(u8),
}

impl IpProtocol {
    /// Parses the protocol keyword used in vendor ACL syntax.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "ip" | "ipv6" => Some(IpProtocol::Ip),
            "tcp" => Some(IpProtocol::Tcp),
            "udp" => Some(IpProtocol::Udp),
            "icmp" => Some(IpProtocol::Icmp),
            other => other.parse().ok().map(IpProtocol::Number),
        }
    }

    /// Returns true for protocols that carry ports.
    pub fn has_ports(&self) -> bool {
        matches!(self, IpProtocol::Tcp | IpProtocol::Udp)
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::Ip => f.write_str("ip"),
            IpProtocol::Tcp => f.write_str("tcp"),
            IpProtocol::Udp => f.write_str("udp"),
            IpProtocol::Icmp => f.write_str("icmp"),
            IpProtocol::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Source or destination of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAddress {
    Any,
    Host(IpAddr),
    Prefix(IpPrefix),
}

/// `/acl/acl-sets/acl-set/acl-entries/acl-entry`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    pub sequence_id: u32,
    pub action: ForwardingAction,
    pub protocol: IpProtocol,
    pub source: AclAddress,
    pub destination: AclAddress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<u16>,
}

/// All entries of one ACL set, ordered by sequence id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AclEntries {
    #[serde(default)]
    pub entry: Vec<AclEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_keyword() {
        assert_eq!(IpProtocol::from_keyword("tcp"), Some(IpProtocol::Tcp));
        assert_eq!(IpProtocol::from_keyword("47"), Some(IpProtocol::Number(47)));
        assert_eq!(IpProtocol::from_keyword("gre"), None);
        assert_eq!(IpProtocol::Number(47).to_string(), "47");
        assert!(IpProtocol::Udp.has_ports());
        assert!(!IpProtocol::Icmp.has_ports());
    }
}
