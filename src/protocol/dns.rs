//! DNS query name extraction.
//!
//! Only the first question name is read. Compression pointers are not
//! followed, so a compressed name decodes as the labels before the pointer.

use smallvec::SmallVec;

use super::{AppKind, AppLayer};

/// DNS header size.
const HEADER_LEN: usize = 12;

/// Longest valid label.
const MAX_LABEL_LEN: usize = 63;

/// Parse a DNS message (UDP payload).
///
/// Returns `None` unless the message extends past the 12-byte header.
pub(crate) fn parse(message: &[u8]) -> Option<AppLayer> {
    if message.len() <= HEADER_LEN {
        return None;
    }

    let name = query_name(&message[HEADER_LEN..]);
    Some(AppLayer::new(AppKind::Dns, format!("Query: {name}")))
}

/// Parse a DNS message carried over TCP, skipping the 2-byte length prefix.
pub(crate) fn parse_tcp(payload: &[u8]) -> Option<AppLayer> {
    parse(payload.get(2..)?)
}

/// Walk length-prefixed labels, joining them with dots.
///
/// Stops at the root label, a compression pointer, an invalid label length
/// or the end of data. A label cut off by the end of data is kept.
fn query_name(data: &[u8]) -> String {
    // Typical domain has 2-4 labels (e.g., www.example.com)
    let mut labels: SmallVec<[&[u8]; 4]> = SmallVec::new();
    let mut pos = 0;

    while pos < data.len() {
        let len = data[pos] as usize;

        if len == 0 {
            break;
        }

        // Compression pointer (top 2 bits set)
        if len & 0xc0 == 0xc0 {
            break;
        }

        if len > MAX_LABEL_LEN {
            break;
        }

        let start = pos + 1;
        let end = (start + len).min(data.len());
        labels.push(&data[start..end]);
        pos = start + len;
    }

    let mut name = String::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            name.push('.');
        }
        // Labels are raw octets; map each byte to the code point of the same value.
        name.extend(label.iter().map(|&b| b as char));
    }
    name
}
