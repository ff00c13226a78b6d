//! In-memory reader for the classic pcap container.
//!
//! The whole capture is supplied up front as one buffer. The 24-byte global
//! header is validated once; records are then read lazily by [`Records`],
//! which slices frame bytes out of the shared buffer without copying.

use bytes::Bytes;
use serde::Serialize;

use super::RawRecord;
use crate::error::{FormatError, Result};

/// Size of the global header.
pub const GLOBAL_HEADER_LEN: usize = 24;

/// Size of each per-record header.
pub const RECORD_HEADER_LEN: usize = 16;

/// Magic number of a capture whose fields are in the same (big-endian) order
/// as the magic itself.
pub const MAGIC_NATIVE: u32 = 0xa1b2_c3d4;

/// Magic number of a capture whose multi-byte fields are byte-swapped
/// (little-endian).
pub const MAGIC_SWAPPED: u32 = 0xd4c3_b2a1;

/// Byte order of every multi-byte field after the magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// Fields are big-endian (magic reads `0xa1b2c3d4`).
    Big,
    /// Fields are little-endian (magic reads `0xd4c3b2a1`).
    Little,
}

impl ByteOrder {
    /// Detect byte order from the first four bytes of the capture.
    pub fn detect(magic: [u8; 4]) -> std::result::Result<Self, FormatError> {
        match u32::from_be_bytes(magic) {
            MAGIC_NATIVE => Ok(ByteOrder::Big),
            MAGIC_SWAPPED => Ok(ByteOrder::Little),
            magic => Err(FormatError::UnknownMagic { magic }),
        }
    }

    /// Whether fields must be swapped relative to the magic's own order.
    pub fn is_swapped(&self) -> bool {
        matches!(self, ByteOrder::Little)
    }

    #[inline]
    fn u16(&self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Big => u16::from_be_bytes(bytes),
            ByteOrder::Little => u16::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn u32(&self, bytes: [u8; 4]) -> u32 {
        match self {
            ByteOrder::Big => u32::from_be_bytes(bytes),
            ByteOrder::Little => u32::from_le_bytes(bytes),
        }
    }

    #[inline]
    fn i32(&self, bytes: [u8; 4]) -> i32 {
        self.u32(bytes) as i32
    }
}

/// The parsed global header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureHeader {
    pub byte_order: ByteOrder,
    pub version_major: u16,
    pub version_minor: u16,
    /// GMT to local correction (seconds).
    pub thiszone: i32,
    pub sigfigs: u32,
    pub snaplen: u32,
    /// Link-layer type (1 = Ethernet).
    pub link_type: u32,
}

impl CaptureHeader {
    /// Parse the global header from the start of `data`.
    pub fn parse(data: &[u8]) -> std::result::Result<Self, FormatError> {
        if data.len() < GLOBAL_HEADER_LEN {
            return Err(FormatError::TooShort { len: data.len() });
        }

        let byte_order = ByteOrder::detect([data[0], data[1], data[2], data[3]])?;

        Ok(Self {
            byte_order,
            version_major: byte_order.u16([data[4], data[5]]),
            version_minor: byte_order.u16([data[6], data[7]]),
            thiszone: byte_order.i32([data[8], data[9], data[10], data[11]]),
            sigfigs: byte_order.u32([data[12], data[13], data[14], data[15]]),
            snaplen: byte_order.u32([data[16], data[17], data[18], data[19]]),
            link_type: byte_order.u32([data[20], data[21], data[22], data[23]]),
        })
    }
}

/// Reader over a complete in-memory capture.
///
/// # Example
///
/// ```no_run
/// use capscope::pcap::CaptureReader;
///
/// # fn run(buffer: Vec<u8>) -> capscope::Result<()> {
/// let reader = CaptureReader::new(buffer)?;
/// for record in reader.records() {
///     println!("frame {}: {} bytes", record.frame_number, record.data.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CaptureReader {
    data: Bytes,
    header: CaptureHeader,
}

impl CaptureReader {
    /// Validate the global header of `data`.
    ///
    /// Fails only when the buffer is too short for the header or the magic
    /// number is unknown.
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let header = CaptureHeader::parse(&data)?;

        tracing::debug!(
            byte_order = ?header.byte_order,
            version = %format!("{}.{}", header.version_major, header.version_minor),
            snaplen = header.snaplen,
            link_type = header.link_type,
            "parsed capture global header"
        );

        Ok(Self { data, header })
    }

    /// The parsed global header.
    #[inline]
    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    /// Total size of the capture buffer in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the capture buffer is empty (never true for a valid reader).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate records from the first one.
    ///
    /// Each call starts over, so the sequence can be replayed.
    pub fn records(&self) -> Records<'_> {
        Records {
            reader: self,
            offset: GLOBAL_HEADER_LEN,
            next_frame: 1,
            finished: false,
        }
    }

    /// Read all records into a vector.
    pub fn into_records(self) -> Vec<RawRecord> {
        self.records().collect()
    }
}

/// Iterator over the records of a [`CaptureReader`].
///
/// Ends silently when the next record header or body would extend past the
/// end of the buffer; everything read before that point is kept.
pub struct Records<'a> {
    reader: &'a CaptureReader,
    offset: usize,
    next_frame: u64,
    finished: bool,
}

impl Records<'_> {
    /// Byte offset of the next record header.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn read_u32(&self, at: usize) -> u32 {
        let data = &self.reader.data;
        self.reader
            .header
            .byte_order
            .u32([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    fn stop(&mut self, reason: &'static str) -> Option<RawRecord> {
        tracing::warn!(
            offset = self.offset,
            frame = self.next_frame,
            total = self.reader.data.len(),
            "capture truncated ({reason}), keeping {} records",
            self.next_frame - 1
        );
        self.finished = true;
        None
    }
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        if self.finished {
            return None;
        }

        let total = self.reader.data.len();
        if self.offset == total {
            self.finished = true;
            return None;
        }

        if self.offset + RECORD_HEADER_LEN > total {
            return self.stop("partial record header");
        }

        let ts_sec = self.read_u32(self.offset);
        let ts_usec = self.read_u32(self.offset + 4);
        let captured_len = self.read_u32(self.offset + 8);
        let original_len = self.read_u32(self.offset + 12);

        let body_start = self.offset + RECORD_HEADER_LEN;
        let body_end = match body_start.checked_add(captured_len as usize) {
            Some(end) if end <= total => end,
            _ => return self.stop("frame body past end of buffer"),
        };

        let timestamp_us = (ts_sec as i64) * 1_000_000 + (ts_usec as i64);

        let record = RawRecord {
            frame_number: self.next_frame,
            timestamp_us,
            captured_len,
            original_len,
            data: self.reader.data.slice(body_start..body_end),
        };

        self.offset = body_end;
        self.next_frame += 1;

        Some(record)
    }
}

/// Parse a complete capture into its records.
pub fn parse(data: impl Into<Bytes>) -> Result<Vec<RawRecord>> {
    Ok(CaptureReader::new(data)?.into_records())
}
