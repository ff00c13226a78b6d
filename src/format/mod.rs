//! Value formatting utilities.
//!
//! Provides display forms used across the data model:
//! - MAC addresses (6 bytes -> colon-separated hex)
//! - Byte previews (bytes -> space-separated hex)

mod address;

pub use address::{format_hex, format_mac, MacAddr};
