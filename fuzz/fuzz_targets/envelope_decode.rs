//! Fuzz target for InboundEvent::decode
//!
//! This fuzzer tests envelope decoding with arbitrary byte sequences to find:
//! - Parser crashes or panics
//! - Payload shapes that bypass validation
//! - Recursion blowups on deeply nested JSON
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_proto::InboundEvent;

fuzz_target!(|data: &[u8]| {
    // Attempt to decode arbitrary bytes as an event envelope
    // This should never panic, only return Err for invalid data
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = InboundEvent::decode(text);
    }
});
