//! Fuzz target: `Capture::parse`
//!
//! Arbitrary capture files must parse or fail cleanly; a parsed capture
//! never yields more samples than its header declares.
//!
//! cargo fuzz run fuzz_capture_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use sds_transfer::sds::Capture;

fuzz_target!(|data: &[u8]| {
    if let Ok(cap) = Capture::parse(data) {
        assert!(cap.samples.len() <= cap.header.length as usize);
    }
});
