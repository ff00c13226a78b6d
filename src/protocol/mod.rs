//! Protocol decoding.
//!
//! This module turns the bytes of one Ethernet frame into a [`DecodedPacket`]:
//! an optional sub-record per layer (link, network, transport, application).
//! Decoding never fails. A layer that is absent, unsupported or cut short by
//! the captured length is simply `None`, as are all layers above it.
//!
//! Layers are walked in order:
//!
//! ```text
//! Ethernet ──► IPv4 / IPv6 ──► TCP / UDP ──► DNS / HTTP / TLS (heuristic)
//! ```

mod dns;
mod ethernet;
mod http;
mod ipv4;
mod ipv6;
mod tcp;
mod tls;
mod udp;

// Test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::format::MacAddr;
use crate::pcap::RawRecord;

pub use ethernet::{ethertype, LINKTYPE_ETHERNET};
pub use tcp::{flags, TcpFlags, IP_PROTO_TCP};
pub use udp::IP_PROTO_UDP;

/// Well-known port carrying DNS.
pub const DNS_PORT: u16 = 53;

/// Link-layer sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EthernetLayer {
    pub src_mac: MacAddr,
    pub dst_mac: MacAddr,
    pub ether_type: u16,
}

/// Network-layer sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IpLayer {
    /// 4 or 6.
    pub version: u8,
    pub src: IpAddr,
    pub dst: IpAddr,
    /// Protocol (IPv4) or next-header (IPv6) number.
    pub protocol: u8,
    /// Header length in bytes as declared by the packet.
    pub header_len: u8,
}

/// TCP sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TcpLayer {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: TcpFlags,
    /// Data offset in bytes.
    pub header_len: u8,
    /// Captured bytes following the TCP header.
    pub payload_len: u32,
}

/// UDP sub-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UdpLayer {
    pub src_port: u16,
    pub dst_port: u16,
    /// Length field as carried in the header.
    pub length: u16,
}

/// Transport-layer sub-record. A packet is TCP or UDP, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "proto", rename_all = "UPPERCASE")]
pub enum Transport {
    Tcp(TcpLayer),
    Udp(UdpLayer),
}

impl Transport {
    pub fn src_port(&self) -> u16 {
        match self {
            Transport::Tcp(tcp) => tcp.src_port,
            Transport::Udp(udp) => udp.src_port,
        }
    }

    pub fn dst_port(&self) -> u16 {
        match self {
            Transport::Tcp(tcp) => tcp.dst_port,
            Transport::Udp(udp) => udp.dst_port,
        }
    }

    /// Short protocol label (`TCP` or `UDP`).
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Tcp(_) => "TCP",
            Transport::Udp(_) => "UDP",
        }
    }
}

/// Application protocols recognized by the heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppKind {
    Dns,
    Http,
    Tls,
}

impl AppKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppKind::Dns => "DNS",
            AppKind::Http => "HTTP",
            AppKind::Tls => "TLS",
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-layer sub-record: the detected protocol and a one-line
/// summary (`Query: example.com`, `GET / HTTP/1.1`, `SNI: example.com`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppLayer {
    pub kind: AppKind,
    pub summary: String,
}

impl AppLayer {
    pub fn new(kind: AppKind, summary: impl Into<String>) -> Self {
        Self {
            kind,
            summary: summary.into(),
        }
    }
}

/// Per-frame decode result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedPacket {
    pub eth: Option<EthernetLayer>,
    pub ip: Option<IpLayer>,
    pub transport: Option<Transport>,
    pub app: Option<AppLayer>,
}

impl DecodedPacket {
    pub fn tcp(&self) -> Option<&TcpLayer> {
        match &self.transport {
            Some(Transport::Tcp(tcp)) => Some(tcp),
            _ => None,
        }
    }

    pub fn udp(&self) -> Option<&UdpLayer> {
        match &self.transport {
            Some(Transport::Udp(udp)) => Some(udp),
            _ => None,
        }
    }

    /// Transport bucket used by flow histograms: `TCP`, `UDP` or `Other`.
    pub fn transport_label(&self) -> &'static str {
        self.transport.as_ref().map_or("Other", Transport::name)
    }
}

/// One decoded capture entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    /// 0-based position in the capture.
    pub index: usize,
    pub record: RawRecord,
    pub decoded: DecodedPacket,
}

impl Packet {
    /// Decode `record` as the `index`-th entry of a capture.
    pub fn decode(index: usize, record: RawRecord) -> Self {
        let decoded = decode(&record.data);
        Self {
            index,
            record,
            decoded,
        }
    }

    #[inline]
    pub fn timestamp_us(&self) -> i64 {
        self.record.timestamp_us
    }

    #[inline]
    pub fn original_len(&self) -> u32 {
        self.record.original_len
    }

    pub fn src_ip(&self) -> Option<IpAddr> {
        self.decoded.ip.map(|ip| ip.src)
    }

    pub fn dst_ip(&self) -> Option<IpAddr> {
        self.decoded.ip.map(|ip| ip.dst)
    }

    pub fn tcp(&self) -> Option<&TcpLayer> {
        self.decoded.tcp()
    }
}

/// Decode every layer of an Ethernet frame.
pub fn decode(frame: &[u8]) -> DecodedPacket {
    let mut packet = DecodedPacket::default();

    let Some((eth, rest)) = ethernet::parse(frame) else {
        tracing::trace!(len = frame.len(), "frame shorter than Ethernet header");
        return packet;
    };
    packet.eth = Some(eth);

    let Some((ip, ip_payload)) = parse_ip(eth.ether_type, rest) else {
        return packet;
    };
    packet.ip = Some(ip);

    let Some(ip_payload) = ip_payload else {
        tracing::trace!(header_len = ip.header_len, "IPv4 header length too short");
        return packet;
    };

    let payload = match ip.protocol {
        IP_PROTO_TCP => match tcp::parse(ip_payload) {
            Some((tcp, payload)) => {
                packet.transport = Some(Transport::Tcp(tcp));
                payload
            }
            None => None,
        },
        IP_PROTO_UDP => match udp::parse(ip_payload) {
            Some((udp, payload)) => {
                packet.transport = Some(Transport::Udp(udp));
                Some(payload)
            }
            None => None,
        },
        _ => None,
    };

    if let (Some(transport), Some(payload)) = (packet.transport.as_ref(), payload) {
        packet.app = decode_app(transport, payload);
    }

    packet
}

/// Slice the TCP payload out of a raw Ethernet frame.
///
/// Header lengths are taken from the frame itself (IPv4 IHL or the fixed
/// IPv6 header, then the TCP data offset). Returns `None` when the frame
/// does not carry a well-formed TCP segment.
pub fn tcp_payload(frame: &[u8]) -> Option<&[u8]> {
    let (eth, rest) = ethernet::parse(frame)?;
    let (ip, ip_payload) = parse_ip(eth.ether_type, rest)?;
    if ip.protocol != IP_PROTO_TCP {
        return None;
    }
    let (_, payload) = tcp::parse(ip_payload?)?;
    payload
}

fn parse_ip(ether_type: u16, data: &[u8]) -> Option<(IpLayer, Option<&[u8]>)> {
    match ether_type {
        ethertype::IPV4 => ipv4::parse(data),
        ethertype::IPV6 => ipv6::parse(data).map(|(ip, payload)| (ip, Some(payload))),
        _ => None,
    }
}

fn decode_app(transport: &Transport, payload: &[u8]) -> Option<AppLayer> {
    if payload.is_empty() {
        return None;
    }

    if transport.src_port() == DNS_PORT || transport.dst_port() == DNS_PORT {
        return match transport {
            Transport::Udp(_) => dns::parse(payload),
            Transport::Tcp(_) => dns::parse_tcp(payload),
        };
    }

    if let Transport::Tcp(_) = transport {
        if http::looks_like_http(payload) {
            return Some(http::parse(payload));
        }
        if tls::is_client_hello(payload) {
            return Some(tls::parse(payload));
        }
    }

    None
}
