//! Directed flow aggregation.
//!
//! A flow is all traffic from one IP address to another. Keys are ordered
//! pairs, so A→B and B→A are separate flows. The table is rebuilt from the
//! packet set on every call to [`aggregate`]; nothing is updated in place.
//!
//! TLS ClientHello server names seen along the way fill a [`HostnameTable`]
//! keyed by the destination (server) address.

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use serde::Serialize;

use crate::protocol::{AppKind, Packet};

/// Server address to hostname, learned from TLS SNI.
pub type HostnameTable = BTreeMap<IpAddr, String>;

/// Prefix of TLS summaries that carry a server name.
const SNI_PREFIX: &str = "SNI: ";

/// Ordered (source, destination) pair identifying a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FlowKey {
    pub src: IpAddr,
    pub dst: IpAddr,
}

impl FlowKey {
    pub fn new(src: IpAddr, dst: IpAddr) -> Self {
        Self { src, dst }
    }

    /// The key of the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
        }
    }
}

/// Aggregated statistics for one direction between two hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub source: IpAddr,
    pub target: IpAddr,
    /// Sum of original (on-wire) lengths.
    pub value: u64,
    /// Number of packets.
    pub count: u64,
    /// Packets per transport bucket (`TCP`, `UDP`, `Other`); only buckets
    /// that were hit are present.
    pub protocol_counts: BTreeMap<&'static str, u64>,
    /// Distinct application summaries.
    pub app_info: BTreeSet<String>,
    /// Application kind of the most recent packet that had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_type: Option<AppKind>,
}

impl Flow {
    fn new(key: FlowKey) -> Self {
        Self {
            source: key.src,
            target: key.dst,
            value: 0,
            count: 0,
            protocol_counts: BTreeMap::new(),
            app_info: BTreeSet::new(),
            app_type: None,
        }
    }

    pub fn key(&self) -> FlowKey {
        FlowKey::new(self.source, self.target)
    }

    /// Packet count for a transport bucket.
    pub fn protocol_count(&self, label: &str) -> u64 {
        self.protocol_counts.get(label).copied().unwrap_or(0)
    }
}

/// All flows of a packet set plus the hostnames learned from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowTable {
    #[serde(serialize_with = "serialize_flows")]
    flows: BTreeMap<FlowKey, Flow>,
    hostnames: HostnameTable,
}

fn serialize_flows<S>(flows: &BTreeMap<FlowKey, Flow>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_seq(flows.values())
}

impl FlowTable {
    /// Flow for the ordered pair `src → dst`.
    pub fn get(&self, src: IpAddr, dst: IpAddr) -> Option<&Flow> {
        self.flows.get(&FlowKey::new(src, dst))
    }

    /// All flows ordered by (source, destination).
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn hostnames(&self) -> &HostnameTable {
        &self.hostnames
    }

    /// Hostname learned for `ip`, if any.
    pub fn hostname(&self, ip: IpAddr) -> Option<&str> {
        self.hostnames.get(&ip).map(String::as_str)
    }

    /// Every address that appears as a flow endpoint.
    pub fn hosts(&self) -> BTreeSet<IpAddr> {
        self.flows
            .keys()
            .flat_map(|key| [key.src, key.dst])
            .collect()
    }

    /// Find a host whose address text contains `query`.
    ///
    /// Flows are checked in order; within a flow the source wins over the
    /// target. A blank query matches nothing.
    pub fn find_host(&self, query: &str) -> Option<IpAddr> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        self.flows.values().find_map(|flow| {
            if flow.source.to_string().contains(query) {
                Some(flow.source)
            } else if flow.target.to_string().contains(query) {
                Some(flow.target)
            } else {
                None
            }
        })
    }
}

/// Aggregate packets into directed flows.
///
/// Packets without an IP layer are ignored.
pub fn aggregate<'a, I>(packets: I) -> FlowTable
where
    I: IntoIterator<Item = &'a Packet>,
{
    let mut table = FlowTable::default();

    for packet in packets {
        let Some(ip) = packet.decoded.ip else {
            continue;
        };

        let key = FlowKey::new(ip.src, ip.dst);
        let flow = table.flows.entry(key).or_insert_with(|| Flow::new(key));

        flow.value += u64::from(packet.original_len());
        flow.count += 1;
        *flow
            .protocol_counts
            .entry(packet.decoded.transport_label())
            .or_insert(0) += 1;

        if let Some(app) = &packet.decoded.app {
            flow.app_info.insert(app.summary.clone());
            flow.app_type = Some(app.kind);

            if app.kind == AppKind::Tls {
                if let Some(host) = app.summary.strip_prefix(SNI_PREFIX) {
                    table.hostnames.insert(ip.dst, host.to_string());
                }
            }
        }
    }

    tracing::debug!(
        flows = table.flows.len(),
        hostnames = table.hostnames.len(),
        "aggregated flows"
    );

    table
}
