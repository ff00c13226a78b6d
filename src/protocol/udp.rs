//! UDP header.

use etherparse::UdpHeaderSlice;

use super::UdpLayer;

/// IP protocol number for UDP.
pub const IP_PROTO_UDP: u8 = 17;

/// Parse the 8-byte UDP header. The payload is every captured byte after it,
/// regardless of the length field.
pub(crate) fn parse(data: &[u8]) -> Option<(UdpLayer, &[u8])> {
    let udp = UdpHeaderSlice::from_slice(data).ok()?;

    let layer = UdpLayer {
        src_port: udp.source_port(),
        dst_port: udp.destination_port(),
        length: udp.length(),
    };

    Some((layer, &data[udp.slice().len()..]))
}
