//! Fuzz target: `Message::decode`
//!
//! Drives arbitrary byte sequences into the message decoder and asserts
//! that it never panics and that anything it accepts re-encodes to a
//! frame of the same fixed size.
//!
//! cargo fuzz run fuzz_message_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sds_transfer::sds::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(msg) = Message::decode(data) {
        let bytes = msg.to_bytes();
        assert_eq!(bytes.len(), data.len(), "accepted frame changed size");
        assert_eq!(bytes.len(), msg.encoded_len());

        // Fields are masked on encode, so a second pass is stable.
        let again = Message::decode(&bytes).expect("re-encoded frame must decode");
        assert_eq!(again.to_bytes(), bytes);
    }
});
