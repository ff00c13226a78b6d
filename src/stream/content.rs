//! Payload classification and preview rendering.

use serde::Serialize;

use crate::format::format_hex;

/// Bytes of each payload examined for classification and preview.
pub const PREVIEW_LIMIT: usize = 500;

/// Printable fraction of the preview above which a payload is text.
pub const TEXT_RATIO: f64 = 0.7;

/// Bytes shown in a binary payload's hex preview.
pub const HEX_PREVIEW_LEN: usize = 16;

/// Whether a payload reads as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Binary,
}

/// Printable ASCII plus tab, line feed and carriage return.
#[inline]
pub fn is_printable(byte: u8) -> bool {
    matches!(byte, 0x20..=0x7e | b'\t' | b'\n' | b'\r')
}

/// Classify a non-empty payload and render its preview.
///
/// Text previews show the first [`PREVIEW_LIMIT`] bytes with non-printable
/// bytes replaced by `.`; binary previews show a short hex dump.
pub fn analyze(payload: &[u8]) -> (ContentKind, String) {
    let window = &payload[..payload.len().min(PREVIEW_LIMIT)];
    let printable = window.iter().filter(|&&b| is_printable(b)).count();

    let is_text = !window.is_empty() && printable as f64 / window.len() as f64 > TEXT_RATIO;

    if is_text {
        let mut text: String = window
            .iter()
            .map(|&b| if is_printable(b) { b as char } else { '.' })
            .collect();
        if payload.len() > PREVIEW_LIMIT {
            text.push_str("... (truncated)");
        }
        (ContentKind::Text, text)
    } else {
        let hex = format_hex(payload, HEX_PREVIEW_LEN);
        (ContentKind::Binary, format!("Hex: {hex} ..."))
    }
}
