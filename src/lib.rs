//! capscope - offline packet capture analysis.
//!
//! This library decodes classic pcap captures held in memory into a
//! structured data model and derives views from it: directed traffic flows,
//! followed TCP conversations, anomaly alerts and traffic statistics.
//!
//! # Architecture
//!
//! ```text
//! bytes ──► pcap::CaptureReader ──► RawRecord ──► protocol::decode ──► Packet
//!                                                                       │
//!            ┌──────────────────────┬──────────────────────┬────────────┤
//!            ▼                      ▼                      ▼            ▼
//!     flow::aggregate        stream::follow         security::scan   stats::*
//!   FlowTable + hostnames     StreamRecord       Vec<SecurityAlert>
//! ```
//!
//! Decoding is available synchronously ([`pipeline::decode_capture`]) or on
//! a background thread with progress events ([`pipeline::spawn_decode`]).
//! Everything downstream is a pure function of a packet slice.
//!
//! # Example
//!
//! ```no_run
//! use capscope::prelude::*;
//!
//! # fn run(buffer: Vec<u8>) -> capscope::Result<()> {
//! let packets = decode_capture(buffer)?;
//!
//! let flows = aggregate(&packets);
//! for flow in flows.flows() {
//!     println!("{} -> {}: {} bytes", flow.source, flow.target, flow.value);
//! }
//!
//! for alert in scan(&packets) {
//!     println!("[{}] {}: {}", alert.severity, alert.kind, alert.detail);
//! }
//!
//! if let Some(seed) = packets.iter().find(|p| p.tcp().is_some()) {
//!     println!("{}", follow(seed, &packets)?.transcript);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod format;
pub mod pcap;
pub mod pipeline;
pub mod prelude;
pub mod protocol;
pub mod security;
pub mod stats;
pub mod stream;

pub use error::{Error, FormatError, Result};
