//! Dotted-quad addresses and CIDR prefixes.
//!
//! The wire protocol and the simulated topology both work in terms of plain
//! 32-bit integers; this module is the sole place that translates to and
//! from the dotted-quad strings that actually cross the wire.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RouterError;

/// A 32-bit address, presented on the wire as a dotted quad.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Addr(pub u32);

impl Addr {
    /// The neighbor's own address with the low octet replaced by `1`.
    ///
    /// In the simulation topology a neighbor on link `X.Y.Z.?` exposes `.2`
    /// to us and we expose `.1`; this is our address on that link.
    pub fn self_addr(self) -> Addr {
        Addr((self.0 & !0xff) | 1)
    }

    /// The neighbor's own address with the low octet replaced by `2`.
    pub fn peer_addr(self) -> Addr {
        Addr((self.0 & !0xff) | 2)
    }
}

impl fmt::Display for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_dotted(self.0))
    }
}

impl FromStr for Addr {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        to_int(s).map(Addr)
    }
}

impl Serialize for Addr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Addr {
    fn deserialize<D>(deserializer: D) -> Result<Addr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Addr::from_str(&s).map_err(de::Error::custom)
    }
}

/// A (network, length) pair naming a contiguous block of addresses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Prefix {
    pub network: Addr,
    pub length: u8,
}

impl Prefix {
    pub fn new(network: Addr, length: u8) -> Self {
        Self { network, length }
    }

    /// Parse from a (network, dotted-netmask) pair, as received on the wire.
    pub fn from_network_and_mask(network: Addr, netmask: Addr) -> Result<Self, RouterError> {
        let length = mask_to_len(netmask.0)?;
        Ok(Self { network, length })
    }

    /// Does the top `self.length` bits of `self.network` equal the top
    /// `self.length` bits of `dest`?
    pub fn matches(&self, dest: Addr) -> bool {
        if self.length == 0 {
            return true;
        }
        let shift = 32 - u32::from(self.length);
        (self.network.0 >> shift) == (dest.0 >> shift)
    }

    pub fn netmask(&self) -> Addr {
        Addr(len_to_mask(self.length))
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.length)
    }
}

/// Convert a dotted quad (e.g. `"192.168.0.1"`) to its 32-bit integer form.
///
/// ```
/// use asbgpd::addr::to_int;
/// assert_eq!(to_int("192.168.0.1").unwrap(), 0xC0A80001);
/// ```
pub fn to_int(dotted: &str) -> Result<u32, RouterError> {
    let octets: Vec<&str> = dotted.split('.').collect();
    if octets.len() != 4 {
        return Err(RouterError::Malformed(format!(
            "not a dotted quad: '{}'",
            dotted
        )));
    }
    let mut value: u32 = 0;
    for octet in octets {
        let byte: u8 = octet
            .parse()
            .map_err(|_| RouterError::Malformed(format!("not a dotted quad: '{}'", dotted)))?;
        value = (value << 8) | u32::from(byte);
    }
    Ok(value)
}

/// Convert a 32-bit address into its dotted-quad string form.
///
/// ```
/// use asbgpd::addr::to_dotted;
/// assert_eq!(to_dotted(0xC0A80001), "192.168.0.1");
/// ```
pub fn to_dotted(value: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (value >> 24) & 0xff,
        (value >> 16) & 0xff,
        (value >> 8) & 0xff,
        value & 0xff,
    )
}

/// Population count of a contiguous netmask.
///
/// Behavior on a non-contiguous mask (e.g. `255.0.255.0`) is to reject it:
/// the wire value came off the network and must never panic the reactor.
pub fn mask_to_len(mask: u32) -> Result<u8, RouterError> {
    let len = mask.leading_ones();
    let reconstructed = len_to_mask(len as u8);
    if reconstructed != mask {
        return Err(RouterError::Malformed(format!(
            "non-contiguous netmask: {}",
            to_dotted(mask)
        )));
    }
    Ok(len as u8)
}

/// The dotted form of `n` leading 1-bits followed by `32-n` zero bits.
pub fn len_to_mask(n: u8) -> u32 {
    if n == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(n))
    }
}
