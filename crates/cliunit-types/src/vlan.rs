//! VLAN identifiers and the range lists CLIs print them in.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An 802.1Q VLAN id, 1 through 4094.
///
/// ```
/// use cliunit_types::VlanId;
///
/// let ids = VlanId::parse_list("10,20-22").unwrap();
/// assert_eq!(ids.iter().map(|v| v.as_u16()).collect::<Vec<_>>(), vec![10, 20, 21, 22]);
/// assert!(VlanId::new(4095).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    /// VLAN 1, present on every switch and not removable.
    pub const DEFAULT: VlanId = VlanId(1);

    pub const fn new(id: u16) -> Result<Self, ParseError> {
        if id >= Self::MIN && id <= Self::MAX {
            Ok(VlanId(id))
        } else {
            Err(ParseError::InvalidVlanId(id as u32))
        }
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Expands a comma separated list of ids and `low-high` ranges, as in
    /// `vlan 10,20-22` or `switchport trunk allowed vlan 1-5`.
    ///
    /// The result keeps input order; a reversed range is an error.
    pub fn parse_list(s: &str) -> Result<Vec<VlanId>, ParseError> {
        let mut ids = Vec::new();
        for item in s.split(',').map(str::trim) {
            match item.split_once('-') {
                Some((low, high)) => {
                    let low: VlanId = low.parse()?;
                    let high: VlanId = high.parse()?;
                    if low > high {
                        return Err(ParseError::InvalidVlanId(u32::from(high.0)));
                    }
                    ids.extend((low.0..=high.0).map(VlanId));
                }
                None => ids.push(item.parse()?),
            }
        }
        Ok(ids)
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VlanId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: u32 = s.trim().parse().map_err(|_| ParseError::InvalidVlanId(0))?;
        u16::try_from(id)
            .map_err(|_| ParseError::InvalidVlanId(id))
            .and_then(VlanId::new)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ParseError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        VlanId::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> u16 {
        vlan.0
    }
}
