//! Capture container reading.
//!
//! This module parses a classic libpcap container held entirely in memory
//! and exposes its frames as [`RawRecord`]s.
//!
//! The main types are:
//! - [`CaptureReader`] - validates the global header and iterates records
//! - [`CaptureHeader`] - the parsed 24-byte global header
//! - [`RawRecord`] - one frame with its timestamp and lengths

mod packet;
mod reader;

pub use packet::RawRecord;
pub use reader::{
    parse, ByteOrder, CaptureHeader, CaptureReader, Records, GLOBAL_HEADER_LEN, MAGIC_NATIVE,
    MAGIC_SWAPPED, RECORD_HEADER_LEN,
};
