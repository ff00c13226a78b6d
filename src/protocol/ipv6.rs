//! IPv6 fixed header.
//!
//! Only the 40-byte fixed header is read; extension headers are not
//! traversed, so the next-header byte selects the transport directly.
//! The version nibble is not checked; the ethertype already selected IPv6.

use std::net::{IpAddr, Ipv6Addr};

use super::IpLayer;

/// Length of the fixed IPv6 header.
pub const HEADER_LEN: usize = 40;

pub(crate) fn parse(data: &[u8]) -> Option<(IpLayer, &[u8])> {
    if data.len() < HEADER_LEN {
        return None;
    }

    let layer = IpLayer {
        version: 6,
        src: IpAddr::V6(address(&data[8..24])?),
        dst: IpAddr::V6(address(&data[24..40])?),
        protocol: data[6],
        header_len: HEADER_LEN as u8,
    };

    Some((layer, &data[HEADER_LEN..]))
}

fn address(bytes: &[u8]) -> Option<Ipv6Addr> {
    let octets: [u8; 16] = bytes.try_into().ok()?;
    Some(Ipv6Addr::from(octets))
}
