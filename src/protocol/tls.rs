//! TLS ClientHello server name extraction.
//!
//! Only the structure of the first handshake message is walked; nothing is
//! validated cryptographically.

use super::{AppKind, AppLayer};

/// TLS record content type for handshake messages.
const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

/// Handshake message type for ClientHello.
const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;

/// Size of the TLS record header.
const RECORD_HEADER_LEN: usize = 5;

/// Handshake type (1) + length (3) + client version (2) + random (32).
const CLIENT_HELLO_FIXED_LEN: usize = 38;

/// TLS extension types.
mod extension_type {
    pub const SERVER_NAME: u16 = 0x0000;
}

/// Check whether a TCP payload starts with a handshake record carrying a
/// ClientHello.
pub(crate) fn is_client_hello(payload: &[u8]) -> bool {
    payload.len() > 6
        && payload[0] == CONTENT_TYPE_HANDSHAKE
        && payload[5] == HANDSHAKE_CLIENT_HELLO
}

/// Summarize a ClientHello as `SNI: <host>`, or `Client Hello` when no
/// server name can be read.
pub(crate) fn parse(payload: &[u8]) -> AppLayer {
    let summary = payload
        .get(RECORD_HEADER_LEN..)
        .and_then(server_name)
        .map(|sni| format!("SNI: {sni}"))
        .unwrap_or_else(|| "Client Hello".to_string());

    AppLayer::new(AppKind::Tls, summary)
}

/// Walk a ClientHello handshake message to its server_name extension.
fn server_name(data: &[u8]) -> Option<String> {
    let mut offset = CLIENT_HELLO_FIXED_LEN;

    // Session ID length (1 byte) + session ID
    let session_id_len = *data.get(offset)? as usize;
    offset += 1 + session_id_len;

    // Cipher suites length (2 bytes) + cipher suites
    let cipher_suites_len = read_u16(data, offset)? as usize;
    offset += 2 + cipher_suites_len;

    // Compression methods length (1 byte) + compression methods
    let compression_len = *data.get(offset)? as usize;
    offset += 1 + compression_len;

    // Extensions length (2 bytes). A hello split across segments keeps the
    // extensions that were captured.
    let extensions_len = read_u16(data, offset)? as usize;
    offset += 2;
    let extensions_end = (offset + extensions_len).min(data.len());

    parse_extensions(data.get(offset..extensions_end)?)
}

/// Scan extensions for server_name.
fn parse_extensions(data: &[u8]) -> Option<String> {
    let mut offset = 0;

    while offset + 4 <= data.len() {
        let ext_type = u16::from_be_bytes([data[offset], data[offset + 1]]);
        let ext_len = u16::from_be_bytes([data[offset + 2], data[offset + 3]]) as usize;
        offset += 4;

        if offset + ext_len > data.len() {
            return None;
        }

        if ext_type == extension_type::SERVER_NAME {
            return parse_sni_extension(&data[offset..offset + ext_len]);
        }

        offset += ext_len;
    }

    None
}

/// Parse the SNI extension and extract the first host name.
fn parse_sni_extension(data: &[u8]) -> Option<String> {
    // SNI extension format:
    // - Server Name List Length (2 bytes)
    // - Server Name Type (1 byte) - 0 = hostname
    // - Server Name Length (2 bytes)
    // - Server Name (variable)

    if data.len() < 5 {
        return None;
    }

    let mut offset = 2;

    while offset + 3 <= data.len() {
        let name_type = data[offset];
        let name_len = u16::from_be_bytes([data[offset + 1], data[offset + 2]]) as usize;
        offset += 3;

        if offset + name_len > data.len() {
            return None;
        }

        if name_type == 0 {
            return std::str::from_utf8(&data[offset..offset + name_len])
                .ok()
                .map(str::to_string);
        }

        offset += name_len;
    }

    None
}

#[inline]
fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
