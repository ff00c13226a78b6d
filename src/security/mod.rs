//! Heuristic anomaly detection over a decoded packet set.
//!
//! Two independent detectors run over the same batch:
//!
//! - **Port scan**: a source that sends connection attempts (SYN without
//!   ACK) to more than [`PORT_SCAN_THRESHOLD`] distinct destination ports.
//! - **DNS tunneling**: a DNS query summary containing a dotted token longer
//!   than [`DNS_TOKEN_THRESHOLD`] characters.
//!
//! [`scan`] keeps no state between calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::IpAddr;

use serde::{Serialize, Serializer};

use crate::protocol::{AppKind, Packet};

/// Distinct destination ports per source above which a port scan is reported.
pub const PORT_SCAN_THRESHOLD: usize = 20;

/// Token length above which a dotted DNS name is reported.
pub const DNS_TOKEN_THRESHOLD: usize = 50;

/// Characters of an offending DNS token quoted in the alert detail.
const DNS_DETAIL_PREFIX: usize = 30;

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Medium => write!(f, "MEDIUM"),
            Severity::High => write!(f, "HIGH"),
        }
    }
}

/// What a detector found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlertKind {
    PortScan,
    DnsTunneling,
}

impl AlertKind {
    /// Human-readable alert title.
    pub fn title(&self) -> &'static str {
        match self {
            AlertKind::PortScan => "Port Scan Detected",
            AlertKind::DnsTunneling => "DNS Tunneling Suspected",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Target of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertTarget {
    Host(IpAddr),
    /// Many destinations (port scans).
    Multiple,
}

impl fmt::Display for AlertTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertTarget::Host(ip) => write!(f, "{ip}"),
            AlertTarget::Multiple => f.write_str("Multiple"),
        }
    }
}

impl Serialize for AlertTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One detector finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityAlert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub source: IpAddr,
    pub target: AlertTarget,
    pub detail: String,
    pub timestamp_us: i64,
}

/// Run both detectors over `packets`.
///
/// DNS tunneling alerts come first, in packet order; port scan alerts
/// follow, ordered by source address.
pub fn scan(packets: &[Packet]) -> Vec<SecurityAlert> {
    let mut alerts = Vec::new();
    let mut scanners: BTreeMap<IpAddr, BTreeSet<u16>> = BTreeMap::new();

    for packet in packets {
        if let (Some(ip), Some(tcp)) = (packet.decoded.ip, packet.tcp()) {
            if tcp.flags.is_syn_only() {
                scanners.entry(ip.src).or_default().insert(tcp.dst_port);
            }
        }

        check_dns_tunneling(packet, &mut alerts);
    }

    // Batch-level attribution: port scans carry the first packet's time.
    let batch_start = packets.first().map_or(0, Packet::timestamp_us);

    for (source, ports) in scanners {
        if ports.len() > PORT_SCAN_THRESHOLD {
            tracing::debug!(%source, ports = ports.len(), "port scan detected");
            alerts.push(SecurityAlert {
                kind: AlertKind::PortScan,
                severity: Severity::Medium,
                source,
                target: AlertTarget::Multiple,
                detail: format!("Scanned {} unique ports.", ports.len()),
                timestamp_us: batch_start,
            });
        }
    }

    alerts
}

fn check_dns_tunneling(packet: &Packet, alerts: &mut Vec<SecurityAlert>) {
    let (Some(ip), Some(app)) = (packet.decoded.ip, packet.decoded.app.as_ref()) else {
        return;
    };
    if app.kind != AppKind::Dns {
        return;
    }

    for token in app.summary.split_whitespace() {
        if token.contains('.') && token.chars().count() > DNS_TOKEN_THRESHOLD {
            let prefix: String = token.chars().take(DNS_DETAIL_PREFIX).collect();
            alerts.push(SecurityAlert {
                kind: AlertKind::DnsTunneling,
                severity: Severity::High,
                source: ip.src,
                target: AlertTarget::Host(ip.dst),
                detail: format!("Suspiciously long query: {prefix}..."),
                timestamp_us: packet.timestamp_us(),
            });
        }
    }
}
