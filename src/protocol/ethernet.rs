//! Ethernet II header.

use etherparse::Ethernet2HeaderSlice;

use super::EthernetLayer;
use crate::format::MacAddr;

/// Link type constant for Ethernet.
pub const LINKTYPE_ETHERNET: u32 = 1;

/// Well-known EtherTypes.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const IPV6: u16 = 0x86DD;
}

/// Parse the 14-byte Ethernet II header, returning the layer and the bytes
/// that follow it.
pub(crate) fn parse(data: &[u8]) -> Option<(EthernetLayer, &[u8])> {
    let eth = Ethernet2HeaderSlice::from_slice(data).ok()?;

    let layer = EthernetLayer {
        src_mac: MacAddr(eth.source()),
        dst_mac: MacAddr(eth.destination()),
        ether_type: eth.ether_type().0,
    };

    Some((layer, &data[eth.slice().len()..]))
}
