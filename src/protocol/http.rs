//! HTTP/1.x first-line extraction.

use super::{AppKind, AppLayer};

/// Longest first line read.
const MAX_LINE_LEN: usize = 200;

/// Prefixes of request methods and status lines that trigger detection.
const HTTP_PREFIXES: &[&[u8]] = &[b"GET ", b"POST", b"PUT ", b"DELE", b"HTTP"];

/// Check whether a TCP payload starts like an HTTP request or response.
pub(crate) fn looks_like_http(payload: &[u8]) -> bool {
    HTTP_PREFIXES.iter().any(|prefix| payload.starts_with(prefix))
}

/// Summarize a payload as its trimmed first line.
pub(crate) fn parse(payload: &[u8]) -> AppLayer {
    let limit = payload.len().min(MAX_LINE_LEN);
    let line: String = payload[..limit]
        .iter()
        .take_while(|&&b| b != b'\n')
        .map(|&b| b as char)
        .collect();

    AppLayer::new(AppKind::Http, line.trim())
}
