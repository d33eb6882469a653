#![no_main]

use brl_engine::{Classify, Decompressor, Limits};
use libfuzzer_sys::fuzz_target;

// Fuzz target: arbitrary bytes through the Brotli engine.
//
// Catches bugs in:
// - Growth loop termination on hostile streams
// - Output ceiling enforcement (peak must stay under max_output)
// - Error classification (every failure maps to a code)
fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_output: 1 << 20,
        max_input: 64 * 1024,
        ..Limits::default()
    };
    let Ok(engine) = Decompressor::new().with_limits(limits) else {
        return;
    };
    match engine.decompress(data) {
        Ok(out) => {
            assert!(!out.is_empty());
            assert!(out.peak_capacity() <= limits.max_output);
        }
        Err(e) => {
            assert!(e.kind().code() > 0);
        }
    }
});
