//! TCP stream following.
//!
//! [`follow`] collects every packet of one TCP conversation (both
//! directions of the seed packet's 4-tuple), orders them by capture time and
//! renders their payloads as a readable transcript.
//!
//! Ordering is by timestamp only. Sequence numbers are not consulted, so
//! retransmitted or reordered segments appear in arrival order.

mod content;

use std::net::IpAddr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::protocol::{self, Packet};

pub use content::{analyze, is_printable, ContentKind, HEX_PREVIEW_LEN, PREVIEW_LIMIT, TEXT_RATIO};

/// Transcript of a stream with no payload bytes.
pub const EMPTY_STREAM: &str = "Empty stream (only handshake/control packets).";

/// Printable share of all payload bytes below which the binary banner is shown.
pub const BINARY_STREAM_RATIO: f64 = 0.1;

/// The seed packet's 4-tuple, as captured (not normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StreamKey {
    pub src_ip: IpAddr,
    pub src_port: u16,
    pub dst_ip: IpAddr,
    pub dst_port: u16,
}

impl StreamKey {
    /// Derive the key from a seed packet.
    pub fn from_packet(seed: &Packet) -> Result<Self> {
        let frame = seed.record.frame_number;
        let ip = seed.decoded.ip.ok_or(Error::InvalidSeed {
            frame,
            reason: "packet has no IP layer",
        })?;
        let tcp = seed.decoded.tcp().ok_or(Error::InvalidSeed {
            frame,
            reason: "packet has no TCP layer",
        })?;

        Ok(Self {
            src_ip: ip.src,
            src_port: tcp.src_port,
            dst_ip: ip.dst,
            dst_port: tcp.dst_port,
        })
    }

    /// Direction of `packet` relative to this key, or `None` if it belongs to
    /// another conversation.
    pub fn direction_of(&self, packet: &Packet) -> Option<Direction> {
        let ip = packet.decoded.ip?;
        let tcp = packet.decoded.tcp()?;

        if ip.src == self.src_ip
            && tcp.src_port == self.src_port
            && ip.dst == self.dst_ip
            && tcp.dst_port == self.dst_port
        {
            Some(Direction::ToServer)
        } else if ip.src == self.dst_ip
            && tcp.src_port == self.dst_port
            && ip.dst == self.src_ip
            && tcp.dst_port == self.src_port
        {
            Some(Direction::ToClient)
        } else {
            None
        }
    }
}

/// Direction of data relative to the seed packet. The seed's sender is
/// treated as the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ToServer,
    ToClient,
}

impl Direction {
    /// Return a string representation of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ToServer => "to_server",
            Direction::ToClient => "to_client",
        }
    }

    /// Arrow used in transcript lines.
    pub fn arrow(&self) -> char {
        match self {
            Direction::ToServer => '→',
            Direction::ToClient => '←',
        }
    }
}

/// One payload-carrying segment of the stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub frame_number: u64,
    pub direction: Direction,
    pub timestamp_us: i64,
    pub payload_len: usize,
    pub kind: ContentKind,
    pub preview: String,
}

impl TranscriptEntry {
    fn render(&self, out: &mut String) {
        let secs = self.timestamp_us as f64 / 1_000_000.0;
        let arrow = self.direction.arrow();
        let tag = match self.kind {
            ContentKind::Text => ":",
            ContentKind::Binary => " [Binary/Encrypted]",
        };
        out.push_str(&format!(
            "[{secs:.4}] {arrow} ({} bytes){tag}\n{}\n\n",
            self.payload_len, self.preview
        ));
    }
}

/// A followed TCP conversation.
#[derive(Debug, Clone, Serialize)]
pub struct StreamRecord<'a> {
    pub key: StreamKey,
    /// Matching packets in timestamp order, including those without payload.
    pub packets: Vec<&'a Packet>,
    pub entries: Vec<TranscriptEntry>,
    /// Payload bytes across all entries.
    pub total_payload: usize,
    /// Payload bytes of entries classified as text.
    pub printable_payload: usize,
    pub transcript: String,
}

impl StreamRecord<'_> {
    /// Whether the binary/encrypted banner applies.
    pub fn is_binary(&self) -> bool {
        self.total_payload > 0
            && (self.printable_payload as f64) < self.total_payload as f64 * BINARY_STREAM_RATIO
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Packets of the seed's conversation, both directions, in timestamp order.
pub fn stream_packets<'a>(seed: &Packet, all: &'a [Packet]) -> Result<Vec<&'a Packet>> {
    let key = StreamKey::from_packet(seed)?;
    Ok(matching(&key, all))
}

fn matching<'a>(key: &StreamKey, all: &'a [Packet]) -> Vec<&'a Packet> {
    let mut packets: Vec<&Packet> = all
        .iter()
        .filter(|p| key.direction_of(p).is_some())
        .collect();
    packets.sort_by_key(|p| p.timestamp_us());
    packets
}

/// Follow the TCP conversation containing `seed`.
///
/// Fails with [`Error::InvalidSeed`] if the seed has no IP or TCP layer.
pub fn follow<'a>(seed: &Packet, all: &'a [Packet]) -> Result<StreamRecord<'a>> {
    let key = StreamKey::from_packet(seed)?;
    let packets = matching(&key, all);

    let mut entries = Vec::new();
    let mut total_payload = 0;
    let mut printable_payload = 0;

    for packet in &packets {
        let Some(direction) = key.direction_of(packet) else {
            continue;
        };
        let payload = match protocol::tcp_payload(&packet.record.data) {
            Some(payload) if !payload.is_empty() => payload,
            _ => continue,
        };

        let (kind, preview) = analyze(payload);
        total_payload += payload.len();
        if kind == ContentKind::Text {
            printable_payload += payload.len();
        }

        entries.push(TranscriptEntry {
            frame_number: packet.record.frame_number,
            direction,
            timestamp_us: packet.timestamp_us(),
            payload_len: payload.len(),
            kind,
            preview,
        });
    }

    let mut record = StreamRecord {
        key,
        packets,
        entries,
        total_payload,
        printable_payload,
        transcript: String::new(),
    };
    record.transcript = render_transcript(&record);

    tracing::debug!(
        packets = record.packets.len(),
        segments = record.entries.len(),
        bytes = record.total_payload,
        "followed TCP stream"
    );

    Ok(record)
}

fn render_transcript(record: &StreamRecord<'_>) -> String {
    if record.entries.is_empty() {
        return EMPTY_STREAM.to_string();
    }

    let mut out = String::new();
    if record.is_binary() {
        out.push_str("*** STREAM CONTAINS BINARY/ENCRYPTED DATA ***\n");
        out.push_str(&format!("Total Payload: {} bytes\n\n", record.total_payload));
    }
    for entry in &record.entries {
        entry.render(&mut out);
    }
    out
}
