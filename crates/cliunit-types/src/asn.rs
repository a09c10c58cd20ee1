//! BGP autonomous system number.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 4-byte autonomous system number.
///
/// Parses both plain (`4200000001`) and asdot (`64086.59905`) notation;
/// always displays as plain.
///
/// ```
/// use cliunit_types::AsNumber;
///
/// let asn: AsNumber = "1.10".parse().unwrap();
/// assert_eq!(asn.as_u32(), 65546);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AsNumber(u32);

impl AsNumber {
    pub const fn new(asn: u32) -> Self {
        AsNumber(asn)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AsNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AsNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidAsNumber(s.to_string());
        match s.split_once('.') {
            Some((high, low)) => {
                let high: u16 = high.parse().map_err(|_| invalid())?;
                let low: u16 = low.parse().map_err(|_| invalid())?;
                Ok(AsNumber((u32::from(high) << 16) | u32::from(low)))
            }
            None => s.parse().map(AsNumber).map_err(|_| invalid()),
        }
    }
}

impl From<u32> for AsNumber {
    fn from(asn: u32) -> Self {
        AsNumber(asn)
    }
}
