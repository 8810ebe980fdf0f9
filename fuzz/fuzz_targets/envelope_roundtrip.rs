//! Fuzz target for envelope round-trip consistency
//!
//! Any input that decodes successfully must re-encode to an envelope that
//! decodes back to an equal event. Extra payload fields are dropped on the
//! first decode, so the re-encoded form is the canonical one.

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_proto::InboundEvent;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(event) = InboundEvent::decode(text) else {
        return;
    };

    let encoded = event.encode().expect("decoded event must re-encode");
    let again = InboundEvent::decode(&encoded).expect("canonical envelope must decode");
    assert_eq!(event, again);
});
