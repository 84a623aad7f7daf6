#![no_main]

use libfuzzer_sys::fuzz_target;

use clearfeed::datetime::normalize_timestamp;
use clearfeed::feeds::parser::parse_feed_bytes;
use clearfeed::feeds::raw_dates::scan_raw_timestamps;

fuzz_target!(|data: &[u8]| {
    // Neither parser may panic, whatever the bytes
    if let Ok(entries) = parse_feed_bytes(data) {
        for entry in entries {
            let _ = normalize_timestamp(Some(&entry.published));
        }
    }
    let _ = scan_raw_timestamps(&String::from_utf8_lossy(data));
});
