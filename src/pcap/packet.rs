//! Raw record representation.

use bytes::Bytes;
use serde::Serialize;

/// One frame record from a capture container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    /// Frame number (1-indexed, matching Wireshark).
    pub frame_number: u64,

    /// Capture timestamp in microseconds since epoch.
    ///
    /// Seconds and microseconds are combined exactly once, when the record
    /// header is read. Use [`RawRecord::timestamp`] for the seconds view.
    pub timestamp_us: i64,

    /// Captured length (may be less than original).
    pub captured_len: u32,

    /// Original length on the wire.
    pub original_len: u32,

    /// Raw frame bytes (a zero-copy slice of the capture buffer).
    #[serde(skip)]
    pub data: Bytes,
}

impl RawRecord {
    /// Create a new raw record.
    pub fn new(
        frame_number: u64,
        timestamp_us: i64,
        captured_len: u32,
        original_len: u32,
        data: Bytes,
    ) -> Self {
        Self {
            frame_number,
            timestamp_us,
            captured_len,
            original_len,
            data,
        }
    }

    /// Capture timestamp as real-valued seconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp_us as f64 / 1_000_000.0
    }

    /// Check if the frame was truncated during capture.
    pub fn is_truncated(&self) -> bool {
        self.captured_len < self.original_len
    }
}
