//! TCP header.

use serde::Serialize;

use super::TcpLayer;

/// IP protocol number for TCP.
pub const IP_PROTO_TCP: u8 = 6;

/// Minimum TCP header length.
pub const MIN_HEADER_LEN: usize = 20;

/// TCP flags bit positions.
pub mod flags {
    pub const FIN: u16 = 0x001;
    pub const SYN: u16 = 0x002;
    pub const RST: u16 = 0x004;
    pub const PSH: u16 = 0x008;
    pub const ACK: u16 = 0x010;
    pub const URG: u16 = 0x020;
}

/// Decoded control flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub psh: bool,
    pub urg: bool,
}

impl TcpFlags {
    /// Decode from the low 9 bits of the offset/flags word.
    pub fn from_bits(bits: u16) -> Self {
        Self {
            syn: bits & flags::SYN != 0,
            ack: bits & flags::ACK != 0,
            fin: bits & flags::FIN != 0,
            rst: bits & flags::RST != 0,
            psh: bits & flags::PSH != 0,
            urg: bits & flags::URG != 0,
        }
    }

    /// Re-encode the six decoded flags.
    pub fn bits(&self) -> u16 {
        let mut bits = 0;
        for (set, bit) in [
            (self.fin, flags::FIN),
            (self.syn, flags::SYN),
            (self.rst, flags::RST),
            (self.psh, flags::PSH),
            (self.ack, flags::ACK),
            (self.urg, flags::URG),
        ] {
            if set {
                bits |= bit;
            }
        }
        bits
    }

    /// SYN set and ACK clear: a connection attempt.
    pub fn is_syn_only(&self) -> bool {
        self.syn && !self.ack
    }
}

/// Parse a TCP header.
///
/// The returned payload is `None` when the data offset is below the minimum
/// header length or runs past the captured bytes; `payload_len` is then 0.
pub(crate) fn parse(data: &[u8]) -> Option<(TcpLayer, Option<&[u8]>)> {
    if data.len() < MIN_HEADER_LEN {
        return None;
    }

    let offset_flags = u16::from_be_bytes([data[12], data[13]]);
    let header_len = ((offset_flags >> 12) * 4) as u8;

    let payload = if (header_len as usize) < MIN_HEADER_LEN {
        None
    } else {
        data.get(header_len as usize..)
    };

    let layer = TcpLayer {
        src_port: u16::from_be_bytes([data[0], data[1]]),
        dst_port: u16::from_be_bytes([data[2], data[3]]),
        seq: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        ack: u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
        flags: TcpFlags::from_bits(offset_flags & 0x01ff),
        header_len,
        payload_len: payload.map_or(0, |p| p.len() as u32),
    };

    Some((layer, payload))
}
