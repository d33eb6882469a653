//! Shared fixtures for the integration tests and benches.
//!
//! Payloads are generated rather than checked in: text compresses well,
//! noise barely at all, and zero runs are the classic bomb shape.

use std::io::Write;

use brl_engine::Limits;

/// Brotli-compress `data` at quality 9 with a 4 MiB window.
///
/// # Panics
///
/// Never for in-memory buffers.
#[must_use]
pub fn brotli(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 9, 22);
        writer.write_all(data).expect("in-memory write");
    }
    out
}

/// Zstd-compress `data` at level 3.
///
/// # Panics
///
/// Never for in-memory buffers.
#[must_use]
pub fn zstd(data: &[u8]) -> Vec<u8> {
    zstd::encode_all(data, 3).expect("in-memory encode")
}

/// `len` bytes of repetitive ASCII text.
#[must_use]
pub fn text(len: usize) -> Vec<u8> {
    const LINE: &[u8] = b"Bounded decompression keeps every buffer under its ceiling.\n";
    LINE.iter().copied().cycle().take(len).collect()
}

/// `len` bytes of xorshift noise; deterministic for a given `seed`.
#[must_use]
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state.to_le_bytes()[0]
        })
        .collect()
}

/// A brotli stream that inflates to `len` zero bytes.
#[must_use]
pub fn zero_bomb(len: usize) -> Vec<u8> {
    brotli(&vec![0; len])
}

/// Default limits with a smaller output ceiling and input limit.
#[must_use]
pub fn tight(max_output: usize, max_input: usize) -> Limits {
    Limits {
        max_output,
        max_input,
        ..Limits::default()
    }
}
