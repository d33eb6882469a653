#![no_main]

use brl_codec::CodecKind;
use brl_engine::{Decompressor, Limits};
use libfuzzer_sys::fuzz_target;

// Fuzz target: arbitrary bytes through the zstd binding.
//
// Catches bugs in:
// - Frame-end detection on truncated or concatenated frames
// - Output ceiling enforcement
fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_output: 1 << 20,
        max_input: 64 * 1024,
        ..Limits::default()
    };
    if let Ok(engine) = Decompressor::with_codec(CodecKind::Zstd).with_limits(limits) {
        if let Ok(out) = engine.decompress(data) {
            assert!(out.len() <= limits.max_output);
        }
    }
});
