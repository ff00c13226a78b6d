//! Traffic statistics over a decoded packet set.
//!
//! Small pure reductions used for dashboards: protocol mix, busiest
//! senders, a byte-volume timeline, and packet subsets selected by time
//! window or host.

use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::Serialize;

use crate::protocol::Packet;

/// Number of senders shown by default in top-talker listings.
pub const DEFAULT_TOP_TALKERS: usize = 10;

/// Packet count for one protocol label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolShare {
    pub label: String,
    pub count: u64,
}

/// Bytes sent by one source address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopTalker {
    pub ip: IpAddr,
    pub bytes: u64,
}

/// One bucket of the byte-volume timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineBin {
    /// Bucket start (microseconds).
    pub start_us: f64,
    /// Bucket width (microseconds).
    pub width_us: f64,
    /// Sum of original lengths of packets in the bucket.
    pub bytes: u64,
    pub packets: u64,
}

/// The most specific label for a packet: the application kind when one was
/// detected, else its transport bucket (`TCP`, `UDP`, `Other`).
pub fn protocol_label(packet: &Packet) -> &'static str {
    match &packet.decoded.app {
        Some(app) => app.kind.as_str(),
        None => packet.decoded.transport_label(),
    }
}

/// Packets per [`protocol_label`], most frequent first.
pub fn protocol_distribution(packets: &[Packet]) -> Vec<ProtocolShare> {
    let mut counts: BTreeMap<&'static str, u64> = BTreeMap::new();
    for packet in packets {
        *counts.entry(protocol_label(packet)).or_insert(0) += 1;
    }

    let mut shares: Vec<ProtocolShare> = counts
        .into_iter()
        .map(|(label, count)| ProtocolShare {
            label: label.to_string(),
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

/// Source addresses by total bytes sent, largest first, at most `limit`.
pub fn top_talkers(packets: &[Packet], limit: usize) -> Vec<TopTalker> {
    let mut bytes: BTreeMap<IpAddr, u64> = BTreeMap::new();
    for packet in packets {
        if let Some(src) = packet.src_ip() {
            *bytes.entry(src).or_insert(0) += u64::from(packet.original_len());
        }
    }

    let mut talkers: Vec<TopTalker> = bytes
        .into_iter()
        .map(|(ip, bytes)| TopTalker { ip, bytes })
        .collect();
    talkers.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    talkers.truncate(limit);
    talkers
}

/// Byte volume in `bins` equal-width buckets spanning the earliest to the
/// latest timestamp. The latest packet falls in the last bucket.
///
/// When every packet shares one timestamp, all volume lands in the first
/// bucket and the buckets have zero width.
pub fn timeline(packets: &[Packet], bins: usize) -> Vec<TimelineBin> {
    if bins == 0 || packets.is_empty() {
        return Vec::new();
    }

    let (start, end) = packets
        .iter()
        .map(Packet::timestamp_us)
        .fold((i64::MAX, i64::MIN), |(lo, hi), ts| (lo.min(ts), hi.max(ts)));
    let width = (end - start) as f64 / bins as f64;

    let mut timeline: Vec<TimelineBin> = (0..bins)
        .map(|i| TimelineBin {
            start_us: start as f64 + i as f64 * width,
            width_us: width,
            bytes: 0,
            packets: 0,
        })
        .collect();

    for packet in packets {
        let index = if width > 0.0 {
            let offset = (packet.timestamp_us() - start) as f64;
            ((offset / width) as usize).min(bins - 1)
        } else {
            0
        };
        timeline[index].bytes += u64::from(packet.original_len());
        timeline[index].packets += 1;
    }

    timeline
}

/// Packets captured within `[start_us, end_us]`, in capture order.
pub fn time_window(packets: &[Packet], start_us: i64, end_us: i64) -> Vec<&Packet> {
    packets
        .iter()
        .filter(|p| (start_us..=end_us).contains(&p.timestamp_us()))
        .collect()
}

/// Packets sent or received by `ip`, in capture order.
pub fn packets_for_host(packets: &[Packet], ip: IpAddr) -> Vec<&Packet> {
    packets
        .iter()
        .filter(|p| p.src_ip() == Some(ip) || p.dst_ip() == Some(ip))
        .collect()
}
