//! IP prefix type with CIDR and dotted-mask parsing.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// Converts an IPv4 prefix length to a dotted netmask (24 -> 255.255.255.0).
///
/// Lengths above 32 saturate to a host mask.
pub fn prefix_len_to_mask(prefix_len: u8) -> Ipv4Addr {
    let len = u32::from(prefix_len.min(32));
    let bits = if len == 0 { 0 } else { u32::MAX << (32 - len) };
    Ipv4Addr::from(bits)
}

/// Converts a dotted IPv4 netmask to a prefix length.
///
/// # Errors
///
/// Returns an error for non-contiguous masks such as `255.0.255.0`.
pub fn mask_to_prefix_len(mask: Ipv4Addr) -> Result<u8, ParseError> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return Err(ParseError::InvalidNetmask(mask.to_string()));
    }
    Ok(ones as u8)
}

/// An interface address or network prefix (e.g. `10.0.0.1/24`).
///
/// Host bits are preserved: an interface address keeps its own address
/// rather than the network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpPrefix {
    address: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    /// Creates a new IP prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = if address.is_ipv4() { 32 } else { 128 };

        if prefix_len > max_len {
            return Err(ParseError::InvalidIpPrefix(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }

        Ok(IpPrefix {
            address,
            prefix_len,
        })
    }

    /// Builds a prefix from the `address mask` pair printed by IOS
    /// (`ip address 10.0.0.1 255.255.255.0`).
    pub fn from_address_mask(address: &str, mask: &str) -> Result<Self, ParseError> {
        let address: Ipv4Addr = address
            .parse()
            .map_err(|_| ParseError::InvalidIpAddress(address.to_string()))?;
        let mask: Ipv4Addr = mask
            .parse()
            .map_err(|_| ParseError::InvalidNetmask(mask.to_string()))?;
        IpPrefix::new(IpAddr::V4(address), mask_to_prefix_len(mask)?)
    }

    /// Returns the address part of this prefix.
    pub const fn address(&self) -> IpAddr {
        self.address
    }

    /// Returns the prefix length in bits.
    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if this is an IPv4 prefix.
    pub const fn is_ipv4(&self) -> bool {
        self.address.is_ipv4()
    }

    /// Returns the dotted netmask for IPv4 prefixes.
    pub fn netmask(&self) -> Option<Ipv4Addr> {
        self.is_ipv4().then(|| prefix_len_to_mask(self.prefix_len))
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr_str, len_str) = s
            .rsplit_once('/')
            .ok_or_else(|| ParseError::InvalidIpPrefix(s.to_string()))?;

        let address: IpAddr = addr_str
            .parse()
            .map_err(|_| ParseError::InvalidIpAddress(addr_str.to_string()))?;
        let prefix_len: u8 = len_str
            .parse()
            .map_err(|_| ParseError::InvalidIpPrefix(s.to_string()))?;

        IpPrefix::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpPrefix {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpPrefix> for String {
    fn from(prefix: IpPrefix) -> String {
        prefix.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefix_parse() {
        let prefix: IpPrefix = "10.0.0.1/24".parse().unwrap();
        assert_eq!(prefix.address(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(prefix.prefix_len(), 24);
        assert_eq!(prefix.to_string(), "10.0.0.1/24");

        let v6: IpPrefix = "2001:db8::1/64".parse().unwrap();
        assert!(!v6.is_ipv4());
        assert_eq!(v6.netmask(), None);
    }

    #[test]
    fn test_prefix_invalid() {
        assert!("10.0.0.1".parse::<IpPrefix>().is_err());
        assert!("10.0.0.1/33".parse::<IpPrefix>().is_err());
        assert!("bogus/24".parse::<IpPrefix>().is_err());
    }

    #[test]
    fn test_from_address_mask() {
        let prefix = IpPrefix::from_address_mask("192.168.1.1", "255.255.255.252").unwrap();
        assert_eq!(prefix.to_string(), "192.168.1.1/30");
        assert_eq!(
            prefix.netmask(),
            Some(Ipv4Addr::new(255, 255, 255, 252))
        );

        assert!(IpPrefix::from_address_mask("192.168.1.1", "255.0.255.0").is_err());
    }

    #[test]
    fn test_mask_conversions() {
        assert_eq!(prefix_len_to_mask(0), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(prefix_len_to_mask(8), Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(prefix_len_to_mask(32), Ipv4Addr::new(255, 255, 255, 255));
        assert_eq!(mask_to_prefix_len(Ipv4Addr::new(255, 255, 128, 0)), Ok(17));
        assert_eq!(mask_to_prefix_len(Ipv4Addr::new(0, 0, 0, 0)), Ok(0));
        assert_eq!(mask_to_prefix_len(Ipv4Addr::new(255, 255, 255, 255)), Ok(32));
    }
}
