#![no_main]

use std::io::Write;

use arbitrary::Arbitrary;
use brl_engine::{Decompressor, Limits};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    quality: u8,
    lgwin: u8,
    ratio: u8,
}

// Fuzz target: compress → decompress must return the original bytes.
//
// Catches bugs in:
// - Byte loss or duplication across growth steps
// - Cursor handling when the codec fills the buffer exactly
fuzz_target!(|input: FuzzInput| {
    if input.data.is_empty() {
        return;
    }

    let mut compressed = Vec::new();
    {
        let quality = u32::from(input.quality % 12);
        let lgwin = 10 + u32::from(input.lgwin % 15);
        let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, quality, lgwin);
        writer.write_all(&input.data).unwrap();
    }

    let limits = Limits {
        max_ratio: 1 + usize::from(input.ratio % 16),
        ..Limits::default()
    };
    let out = Decompressor::new()
        .with_limits(limits)
        .unwrap()
        .decompress(&compressed)
        .unwrap();
    assert_eq!(out.as_slice(), &input.data[..]);
});
