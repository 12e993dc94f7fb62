//! Text <-> canonical prefix conversion.

use cidrtrie_core::{Error, Prefix};
use ipnet::IpNet;
use std::net::IpAddr;

/// How a key was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Bare address; stands for a `/32` or `/128`.
    Address,
    /// `address/length`.
    Cidr,
}

/// Does `text` use `address/length` notation?
#[inline]
pub fn is_cidr(text: &str) -> bool {
    text.contains('/')
}

/// Accepts "addr/prefix" OR plain address, IPv4 or IPv6.
pub fn parse_with_notation(text: &str) -> Result<(Prefix, Notation), Error> {
    let s = text.trim();
    if is_cidr(s) {
        let net: IpNet = s
            .parse()
            .map_err(|_| Error::from(format!("invalid CIDR {s:?}")))?;
        Ok((Prefix::from(net), Notation::Cidr))
    } else {
        let ip: IpAddr = s
            .parse()
            .map_err(|_| Error::from(format!("invalid IP address {s:?}")))?;
        Ok((Prefix::host(ip), Notation::Address))
    }
}

pub fn parse(text: &str) -> Result<Prefix, Error> {
    parse_with_notation(text).map(|(p, _)| p)
}

/// Always `address/length`, host bits zeroed.
pub fn format(prefix: &Prefix) -> String {
    IpNet::from(*prefix).to_string()
}
