#![no_main]

use brl_engine::{BoundedMessage, MAX_MESSAGE_LEN};
use libfuzzer_sys::fuzz_target;

// Fuzz target: BoundedMessage truncation.
//
// Catches bugs in:
// - Cutting inside a multi-byte character
// - Interior NUL handling
// - C string view disagreeing with the str view
fuzz_target!(|text: &str| {
    let msg = BoundedMessage::new(text);
    assert!(msg.len() <= MAX_MESSAGE_LEN);
    assert!(text.starts_with(msg.as_str()));
    assert_eq!(msg.as_c_str().to_bytes(), msg.as_str().as_bytes());
});
