//! Commonly used types and entry points.
//!
//! ```
//! use capscope::prelude::*;
//! ```

pub use crate::config::PipelineConfig;
pub use crate::error::{Error, FormatError, Result};
pub use crate::flow::{aggregate, Flow, FlowKey, FlowTable, HostnameTable};
pub use crate::pcap::{CaptureHeader, CaptureReader, RawRecord};
pub use crate::pipeline::{decode_capture, spawn_decode, DecodeEvent, DecodeTask};
pub use crate::protocol::{
    decode, AppKind, AppLayer, DecodedPacket, EthernetLayer, IpLayer, Packet, TcpFlags,
    TcpLayer, Transport, UdpLayer,
};
pub use crate::security::{scan, AlertKind, AlertTarget, SecurityAlert, Severity};
pub use crate::stream::{follow, stream_packets, Direction, StreamKey, StreamRecord};
