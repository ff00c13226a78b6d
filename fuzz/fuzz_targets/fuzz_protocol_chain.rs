//! Fuzz target for the frame decoder.
//!
//! Every input is treated as an Ethernet frame and walked through the
//! IP, transport and application layers. Decoding must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let decoded = capscope::protocol::decode(data);
    if decoded.transport.is_some() {
        assert!(decoded.ip.is_some());
    }
    let _ = capscope::protocol::tcp_payload(data);
});
