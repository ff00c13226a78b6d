//! IPv4 header.
//!
//! Total length and checksum are not validated.

use std::net::{IpAddr, Ipv4Addr};

use super::IpLayer;

/// Minimum IPv4 header length.
pub const MIN_HEADER_LEN: usize = 20;

/// Parse an IPv4 header.
///
/// The returned payload is `None` when the declared header length is below
/// the minimum or runs past the captured bytes; the IP layer itself is still
/// reported.
pub(crate) fn parse(data: &[u8]) -> Option<(IpLayer, Option<&[u8]>)> {
    if data.len() < MIN_HEADER_LEN {
        return None;
    }

    let header_len = (data[0] & 0x0f) * 4;
    let src = Ipv4Addr::new(data[12], data[13], data[14], data[15]);
    let dst = Ipv4Addr::new(data[16], data[17], data[18], data[19]);

    let layer = IpLayer {
        version: 4,
        src: IpAddr::V4(src),
        dst: IpAddr::V4(dst),
        protocol: data[9],
        header_len,
    };

    let payload = if (header_len as usize) < MIN_HEADER_LEN {
        None
    } else {
        data.get(header_len as usize..)
    };

    Some((layer, payload))
}
