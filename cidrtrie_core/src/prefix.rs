//! Canonical key: address family, left-aligned address bits and prefix length.

use crate::errors::Error;
use crate::helpers::{canonical, v4_addr, v4_key};
use crate::types::Family;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// An IPv4 or IPv6 prefix in canonical form (host bits zeroed).
///
/// Bits are left-aligned in a `u128`: an IPv4 address sits in the top 32
/// bits. A bare address is a prefix of maximal length for its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix {
    family: Family,
    bits: u128,
    len: u8,
}

impl Prefix {
    /// Build a prefix from left-aligned bits. Host bits beyond `len` are dropped.
    pub fn new(family: Family, bits: u128, len: u8) -> Result<Self, Error> {
        if !family.is_set() {
            return Err(Error::InvalidKey("address family unset".to_string()));
        }
        if len > family.max_len() {
            return Err(Error::InvalidKey(format!(
                "prefix length {len} exceeds {} for {family:?}",
                family.max_len()
            )));
        }
        Ok(Self {
            family,
            bits: canonical(bits, len),
            len,
        })
    }

    pub fn v4(octets: [u8; 4], len: u8) -> Result<Self, Error> {
        Self::new(Family::V4, v4_key(u32::from_be_bytes(octets)), len)
    }

    pub fn v6(octets: [u8; 16], len: u8) -> Result<Self, Error> {
        Self::new(Family::V6, u128::from_be_bytes(octets), len)
    }

    /// Accepts exactly 4 (IPv4) or 16 (IPv6) address bytes.
    pub fn from_bytes(bytes: &[u8], len: u8) -> Result<Self, Error> {
        if let Ok(octets) = <[u8; 4]>::try_from(bytes) {
            Self::v4(octets, len)
        } else if let Ok(octets) = <[u8; 16]>::try_from(bytes) {
            Self::v6(octets, len)
        } else {
            Err(Error::InvalidKey(format!(
                "expected 4 or 16 address bytes, got {}",
                bytes.len()
            )))
        }
    }

    pub fn from_ip(ip: IpAddr, len: u8) -> Result<Self, Error> {
        match ip {
            IpAddr::V4(v4) => Self::v4(v4.octets(), len),
            IpAddr::V6(v6) => Self::v6(v6.octets(), len),
        }
    }

    /// Single-address prefix (`/32` or `/128`).
    pub fn host(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Self {
                family: Family::V4,
                bits: v4_key(u32::from(v4)),
                len: Family::V4.max_len(),
            },
            IpAddr::V6(v6) => Self {
                family: Family::V6,
                bits: u128::from(v6),
                len: Family::V6.max_len(),
            },
        }
    }

    #[inline]
    pub fn family(&self) -> Family {
        self.family
    }

    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    /// Left-aligned address bits.
    #[inline]
    pub fn bits(&self) -> u128 {
        self.bits
    }

    pub fn is_host(&self) -> bool {
        self.len == self.family.max_len()
    }

    pub fn addr(&self) -> IpAddr {
        match self.family {
            Family::V6 => IpAddr::V6(Ipv6Addr::from(self.bits)),
            _ => IpAddr::V4(Ipv4Addr::from(v4_addr(self.bits))),
        }
    }

    /// Network address bytes, 4 for IPv4 and 16 for IPv6.
    pub fn bytes(&self) -> Vec<u8> {
        match self.addr() {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        }
    }

    /// True when every address in `other` is also in `self`.
    pub fn covers(&self, other: &Prefix) -> bool {
        self.family == other.family
            && self.len <= other.len
            && canonical(other.bits, self.len) == self.bits
    }
}

impl From<IpNet> for Prefix {
    fn from(net: IpNet) -> Self {
        match net {
            IpNet::V4(n) => Self {
                family: Family::V4,
                bits: canonical(v4_key(u32::from(n.addr())), n.prefix_len()),
                len: n.prefix_len(),
            },
            IpNet::V6(n) => Self {
                family: Family::V6,
                bits: canonical(u128::from(n.addr()), n.prefix_len()),
                len: n.prefix_len(),
            },
        }
    }
}

impl From<Prefix> for IpNet {
    fn from(p: Prefix) -> Self {
        let net = match p.addr() {
            IpAddr::V4(a) => Ipv4Net::new(a, p.len).map(IpNet::V4),
            IpAddr::V6(a) => Ipv6Net::new(a, p.len).map(IpNet::V6),
        };
        match net {
            Ok(n) => n,
            Err(_) => unreachable!("prefix length validated at construction"),
        }
    }
}

impl From<IpAddr> for Prefix {
    fn from(ip: IpAddr) -> Self {
        Self::host(ip)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.len)
    }
}
