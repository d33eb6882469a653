use brl_codec::{BrotliCodec, Codec, DecoderSession, Progress};
use tracing::{debug, trace};

use crate::arena::OutputArena;
use crate::error::{DecompressError, ErrorKind};
use crate::limits::{Limits, LimitsError};
use crate::result_state::ResultSlot;

/// A fully decoded payload plus diagnostics about how it was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decompressed {
    data: Vec<u8>,
    compressed_len: usize,
    peak_capacity: usize,
    growth_steps: u32,
}

impl Decompressed {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` for values produced by the engine, which reports
    /// zero-length output as [`DecompressError::EmptyOutput`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    #[must_use]
    pub fn compressed_len(&self) -> usize {
        self.compressed_len
    }

    /// Largest output capacity the arena reached during decoding.
    #[must_use]
    pub fn peak_capacity(&self) -> usize {
        self.peak_capacity
    }

    /// How many times the arena doubled.
    #[must_use]
    pub fn growth_steps(&self) -> u32 {
        self.growth_steps
    }

    /// Expansion ratio `decompressed / compressed`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        self.data.len() as f64 / self.compressed_len as f64
    }
}

/// The bounded decompression engine.
///
/// Drives one codec session against one [`OutputArena`] until the codec
/// finishes or a limit is hit. Every call is independent: sessions and
/// arenas never outlive the call that created them.
///
/// ```text
///   input ──► preconditions ──► allocate arena ──► ┌──────────────┐
///                                                  │ codec.advance│◄──┐
///                                                  └──────┬───────┘   │
///                          NeedsMoreOutput ── arena.grow ─┴───────────┘
///                          Done ──► non-empty? ──► Decompressed
///                          Error ──► DecompressionFailed
/// ```
///
/// # Example
///
/// ```rust,no_run
/// use brl_engine::Decompressor;
///
/// let compressed: &[u8] = &[/* brotli stream */];
/// match Decompressor::new().decompress(compressed) {
///     Ok(out) => println!("{} bytes", out.len()),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Decompressor<C = BrotliCodec> {
    codec: C,
    limits: Limits,
}

impl Decompressor<BrotliCodec> {
    /// A Brotli decompressor with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_codec(BrotliCodec)
    }
}

impl Default for Decompressor<BrotliCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> Decompressor<C> {
    #[must_use]
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            limits: Limits::default(),
        }
    }

    /// Replace the limits.
    ///
    /// # Errors
    ///
    /// Returns [`LimitsError`] if `limits` fails [`Limits::validate`].
    pub fn with_limits(mut self, limits: Limits) -> Result<Self, LimitsError> {
        limits.validate()?;
        self.limits = limits;
        Ok(self)
    }

    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Decompress one complete payload.
    ///
    /// # Errors
    ///
    /// - [`DecompressError::EmptyInput`] for a zero-length payload.
    /// - [`DecompressError::InputTooLarge`] above `max_input`.
    /// - [`DecompressError::Allocation`] if a buffer cannot be allocated.
    /// - [`DecompressError::LimitExceeded`] if the output would need to
    ///   grow past `max_output`.
    /// - [`DecompressError::Codec`] if the stream is corrupt or truncated.
    /// - [`DecompressError::EmptyOutput`] if the stream holds no data.
    pub fn decompress(&self, input: &[u8]) -> Result<Decompressed, DecompressError> {
        if input.is_empty() {
            return Err(DecompressError::EmptyInput);
        }
        if input.len() > self.limits.max_input {
            return Err(DecompressError::InputTooLarge {
                size: input.len(),
                limit: self.limits.max_input,
            });
        }

        let initial = self.limits.initial_capacity(input.len());
        let mut arena = OutputArena::allocate(initial, self.limits.max_output)?;
        let mut session = self.codec.open()?;
        debug!(
            codec = self.codec.name(),
            compressed = input.len(),
            initial,
            ceiling = self.limits.max_output,
            "decompression started"
        );

        let mut in_pos = 0;
        loop {
            let (window, out_pos) = arena.window();
            match session.advance(input, &mut in_pos, window, out_pos) {
                Progress::NeedsMoreOutput => {
                    let capacity = arena.grow()?;
                    trace!(capacity, filled = arena.filled(), "output buffer grown");
                }
                Progress::Done => break,
                Progress::Error(e) => return Err(e.into()),
            }
        }
        drop(session);

        if in_pos < input.len() {
            debug!(
                trailing = input.len() - in_pos,
                "ignoring input after end of stream"
            );
        }
        if arena.filled() == 0 {
            return Err(DecompressError::EmptyOutput);
        }

        let peak_capacity = arena.capacity();
        let growth_steps = arena.growth_steps();
        Ok(Decompressed {
            data: arena.into_bytes(),
            compressed_len: input.len(),
            peak_capacity,
            growth_steps,
        })
    }

    /// Decompress `input` and publish the outcome into `slot`.
    ///
    /// The slot is reset before decoding starts, so readers never observe
    /// the previous result next to the new one.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorKind`] that was recorded in `slot`.
    pub fn decompress_into(&self, input: &[u8], slot: &ResultSlot) -> Result<usize, ErrorKind> {
        slot.reset();
        slot.publish(self.decompress(input))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use brl_codec::{CodecError, CodecKind};

    use super::*;
    use crate::error::Classify;

    fn brotli(data: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut writer = ::brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(data).unwrap();
            writer.flush().unwrap();
        }
        compressed
    }

    fn small(max_input: usize, max_output: usize) -> Limits {
        Limits {
            max_input,
            max_output,
            ..Limits::default()
        }
    }

    /// A codec that emits a fixed byte sequence, at most `chunk` bytes per
    /// `advance` call, asking for more room whenever the window is full.
    #[derive(Clone)]
    struct Scripted {
        output: Vec<u8>,
        chunk: usize,
    }

    struct ScriptedSession {
        output: Vec<u8>,
        chunk: usize,
        emitted: usize,
    }

    impl Codec for Scripted {
        type Session = ScriptedSession;

        fn name(&self) -> &'static str {
            "scripted"
        }

        fn open(&self) -> Result<ScriptedSession, CodecError> {
            Ok(ScriptedSession {
                output: self.output.clone(),
                chunk: self.chunk,
                emitted: 0,
            })
        }
    }

    impl DecoderSession for ScriptedSession {
        fn advance(
            &mut self,
            input: &[u8],
            in_pos: &mut usize,
            output: &mut [u8],
            out_pos: &mut usize,
        ) -> Progress {
            *in_pos = input.len();
            while self.emitted < self.output.len() {
                let space = output.len() - *out_pos;
                if space == 0 {
                    return Progress::NeedsMoreOutput;
                }
                let n = space.min(self.chunk).min(self.output.len() - self.emitted);
                output[*out_pos..*out_pos + n]
                    .copy_from_slice(&self.output[self.emitted..self.emitted + n]);
                *out_pos += n;
                self.emitted += n;
            }
            Progress::Done
        }
    }

    #[test]
    fn roundtrip_brotli() {
        let data = b"The quick brown fox jumps over the lazy dog. ".repeat(100);
        let out = Decompressor::new().decompress(&brotli(&data)).unwrap();
        assert_eq!(out.as_slice(), &data[..]);
        assert_eq!(out.len(), data.len());
    }

    #[test]
    fn roundtrip_zstd() {
        let data = b"zstd through the same engine\n".repeat(64);
        let compressed = zstd::encode_all(&data[..], 3).unwrap();
        let out = Decompressor::with_codec(CodecKind::Zstd)
            .decompress(&compressed)
            .unwrap();
        assert_eq!(out.into_vec(), data);
    }

    #[test]
    fn highly_compressible_input_grows_the_arena() {
        let data = vec![0u8; 1 << 20];
        let compressed = brotli(&data);
        let out = Decompressor::new().decompress(&compressed).unwrap();
        assert_eq!(out.len(), data.len());
        assert!(out.growth_steps() > 0);
        assert!(out.peak_capacity() >= data.len());
    }

    #[test]
    fn empty_input_is_invalid() {
        let err = Decompressor::new().decompress(&[]).unwrap_err();
        assert!(matches!(err, DecompressError::EmptyInput));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn input_at_limit_is_accepted_and_above_is_rejected() {
        let engine = Decompressor::new().with_limits(small(64, 4096)).unwrap();
        let mut padded = brotli(b"hello");
        padded.resize(64, 0);

        let at_limit = engine.decompress(&padded);
        assert!(
            !matches!(at_limit, Err(DecompressError::InputTooLarge { .. })),
            "input of exactly max_input bytes must pass the size check"
        );

        padded.push(0);
        let err = engine.decompress(&padded).unwrap_err();
        assert!(matches!(
            err,
            DecompressError::InputTooLarge { size: 65, limit: 64 }
        ));
        assert_eq!(err.kind(), ErrorKind::InputTooLarge);
    }

    #[test]
    fn bomb_hits_the_output_ceiling() {
        let data = vec![b'A'; 256 * 1024];
        let compressed = brotli(&data);
        let engine = Decompressor::new().with_limits(small(1 << 20, 64 * 1024)).unwrap();
        let err = engine.decompress(&compressed).unwrap_err();
        match err {
            DecompressError::LimitExceeded {
                capacity,
                requested,
                ceiling,
            } => {
                assert!(capacity <= ceiling);
                assert!(requested > ceiling);
                assert_eq!(ceiling, 64 * 1024);
            }
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn growth_preserves_bytes_across_many_steps() {
        let expected: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let codec = Scripted {
            output: expected.clone(),
            chunk: 7,
        };
        // One input byte, ratio 1: the arena starts at a single byte.
        let limits = Limits {
            max_ratio: 1,
            ..Limits::default()
        };
        let out = Decompressor::with_codec(codec)
            .with_limits(limits)
            .unwrap()
            .decompress(&[0])
            .unwrap();
        assert_eq!(out.as_slice(), &expected[..]);
        assert_eq!(out.peak_capacity(), 16_384);
        assert_eq!(out.growth_steps(), 14);
    }

    #[test]
    fn scripted_output_exactly_filling_ceiling_succeeds() {
        let codec = Scripted {
            output: vec![1u8; 64],
            chunk: 64,
        };
        let limits = Limits {
            max_ratio: 1,
            max_output: 64,
            ..Limits::default()
        };
        let out = Decompressor::with_codec(codec)
            .with_limits(limits)
            .unwrap()
            .decompress(&[0; 8])
            .unwrap();
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn empty_stream_is_empty_output() {
        let err = Decompressor::new().decompress(&brotli(b"")).unwrap_err();
        assert!(matches!(err, DecompressError::EmptyOutput));
        assert_eq!(err.kind(), ErrorKind::EmptyOutput);
    }

    #[test]
    fn truncated_stream_fails() {
        let data: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 253) as u8).collect();
        let compressed = brotli(&data);
        let err = Decompressor::new()
            .decompress(&compressed[..compressed.len() / 2])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecompressionFailed);
    }

    #[test]
    fn corrupt_stream_fails() {
        let err = Decompressor::new()
            .decompress(&[0x1C, 0x00, 0x00, 0x00])
            .unwrap_err();
        assert!(matches!(err, DecompressError::Codec(CodecError::Corrupt { .. })));
        assert_eq!(err.kind(), ErrorKind::DecompressionFailed);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let limits = Limits {
            max_ratio: 0,
            ..Limits::default()
        };
        assert!(Decompressor::new().with_limits(limits).is_err());
    }

    #[test]
    fn ratio_reports_expansion() {
        let data = vec![b'z'; 10_000];
        let compressed = brotli(&data);
        let out = Decompressor::new().decompress(&compressed).unwrap();
        assert!(out.ratio() > 1.0);
        assert_eq!(out.compressed_len(), compressed.len());
    }

    #[test]
    fn decompress_into_publishes_and_replaces() {
        let slot = ResultSlot::new();
        let engine = Decompressor::new();

        let size = engine.decompress_into(&brotli(b"first"), &slot).unwrap();
        assert_eq!(size, 5);
        assert_eq!(slot.data().as_deref(), Some(&b"first"[..]));

        let kind = engine.decompress_into(&[], &slot).unwrap_err();
        assert_eq!(kind, ErrorKind::InvalidInput);
        assert_eq!(slot.size(), 0);
        assert_eq!(slot.data(), None);
        assert_eq!(slot.error_code(), 1);
    }

    #[test]
    fn unallocatable_arena_is_recorded_as_allocation_failure() {
        let engine = Decompressor::new()
            .with_limits(Limits {
                max_ratio: usize::MAX,
                max_output: usize::MAX,
                ..Limits::default()
            })
            .unwrap();
        let slot = ResultSlot::new();
        slot.publish_success(b"stale".to_vec());

        let kind = engine.decompress_into(&brotli(b"never decoded"), &slot).unwrap_err();
        assert_eq!(kind, ErrorKind::AllocationFailure);
        assert_eq!(slot.error_code(), 3);
        assert_eq!(slot.size(), 0);
        assert_eq!(slot.data(), None);
        assert!(!slot.error_message().is_empty());
    }
}
