//! Fuzz target for capture container parsing.
//!
//! Covers magic detection in both byte orders, the global header and
//! record headers whose lengths run past the buffer.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(reader) = capscope::pcap::CaptureReader::new(data.to_vec()) {
        let mut records = reader.records();
        while let Some(record) = records.next() {
            assert!(records.offset() <= reader.len());
            let _ = capscope::protocol::decode(&record.data);
        }
    }
});
