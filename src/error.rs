//! Error types for capscope.
//!
//! Only two conditions surface as operation failures:
//!
//! - [`FormatError`] - the capture container cannot be read at all (fatal,
//!   zero records returned)
//! - [`Error::InvalidSeed`] - stream following was asked to start from a packet
//!   that is not TCP over IP
//!
//! Everything else (a truncated capture, a layer that fails to decode, an
//! application payload that matches no heuristic) is recovered locally and
//! shows up as missing data rather than as an error.

use thiserror::Error;

/// Main error type for capscope operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The capture container is not a readable pcap file.
    #[error("Capture format error: {0}")]
    Format(#[from] FormatError),

    /// Stream following requires a seed packet with IP and TCP layers.
    #[error("Invalid stream seed (frame {frame}): {reason}")]
    InvalidSeed { frame: u64, reason: &'static str },

    /// The background decode was abandoned before it finished.
    #[error("Capture decode was cancelled")]
    Cancelled,
}

/// Errors related to the capture container header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Buffer is smaller than the 24-byte global header
    #[error("capture too short for global header ({len} bytes, need 24)")]
    TooShort { len: usize },

    /// Magic number matches neither byte order
    #[error("Unknown PCAP magic number: 0x{magic:08x}")]
    UnknownMagic { magic: u32 },
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
