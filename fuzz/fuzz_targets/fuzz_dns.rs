//! Fuzz target for the DNS query-name walk.
//!
//! The input becomes the payload of a UDP datagram to port 53.

#![no_main]

use libfuzzer_sys::fuzz_target;

/// Ethernet + IPv4 + UDP headers, destination port 53.
const DNS_FRAME: [u8; 42] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // dst MAC
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src MAC
    0x08, 0x00, // ethertype: IPv4
    0x45, 0x00, 0x00, 0x00, // version/IHL, TOS, total length (patched)
    0x00, 0x01, 0x00, 0x00, // id, flags/fragment
    0x40, 0x11, 0x00, 0x00, // TTL, protocol (UDP), checksum
    0x0a, 0x00, 0x00, 0x01, // src: 10.0.0.1
    0x08, 0x08, 0x08, 0x08, // dst: 8.8.8.8
    0xc0, 0x00, // src port: 49152
    0x00, 0x35, // dst port: 53
    0x00, 0x00, // length (patched)
    0x00, 0x00, // checksum
];

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut frame = DNS_FRAME.to_vec();

    // IPv4 total length (offset 16-17): IP(20) + UDP(8) + payload
    let ip_total_len = (28 + data.len()) as u16;
    frame[16..18].copy_from_slice(&ip_total_len.to_be_bytes());

    // UDP length (offset 38-39): UDP(8) + payload
    let udp_len = (8 + data.len()) as u16;
    frame[38..40].copy_from_slice(&udp_len.to_be_bytes());

    frame.extend_from_slice(data);

    let decoded = capscope::protocol::decode(&frame);
    assert!(decoded.udp().is_some());
});
