use brotli_decompressor::{BrotliDecompressStream, BrotliResult, BrotliState, StandardAlloc};

use crate::codec::{Codec, DecoderSession, Progress};
use crate::error::CodecError;

const NAME: &str = "brotli";

/// Brotli (RFC 7932) codec backed by `brotli-decompressor`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BrotliCodec;

impl Codec for BrotliCodec {
    type Session = BrotliSession;

    fn name(&self) -> &'static str {
        NAME
    }

    fn open(&self) -> Result<BrotliSession, CodecError> {
        Ok(BrotliSession::new())
    }
}

/// One Brotli decoder state plus its running output counter.
///
/// The state keeps its own ring buffer, so the output slice handed to
/// [`advance`](DecoderSession::advance) may be reallocated between calls.
pub struct BrotliSession {
    state: BrotliState<StandardAlloc, StandardAlloc, StandardAlloc>,
    total_out: usize,
}

impl BrotliSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: BrotliState::new(
                StandardAlloc::default(),
                StandardAlloc::default(),
                StandardAlloc::default(),
            ),
            total_out: 0,
        }
    }

    /// Total bytes this session has produced across all calls.
    #[must_use]
    pub fn total_out(&self) -> usize {
        self.total_out
    }
}

impl Default for BrotliSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderSession for BrotliSession {
    fn advance(
        &mut self,
        input: &[u8],
        in_pos: &mut usize,
        output: &mut [u8],
        out_pos: &mut usize,
    ) -> Progress {
        let mut available_in = input.len() - *in_pos;
        let mut available_out = output.len() - *out_pos;

        let result = BrotliDecompressStream(
            &mut available_in,
            in_pos,
            input,
            &mut available_out,
            out_pos,
            output,
            &mut self.total_out,
            &mut self.state,
        );

        match result {
            BrotliResult::ResultSuccess => Progress::Done,
            BrotliResult::NeedsMoreOutput => Progress::NeedsMoreOutput,
            BrotliResult::NeedsMoreInput => Progress::Error(CodecError::Truncated {
                codec: NAME,
                consumed: *in_pos,
            }),
            BrotliResult::ResultFailure => Progress::Error(CodecError::Corrupt {
                codec: NAME,
                consumed: *in_pos,
                detail: "decoder rejected the stream".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut writer = ::brotli::CompressorWriter::new(&mut compressed, 4096, 5, 22);
            writer.write_all(data).unwrap();
            writer.flush().unwrap();
        }
        compressed
    }

    /// Drive a session to completion with a fixed-size output chunk,
    /// copying out each chunk. Returns the concatenated output and how
    /// many times the session asked for more room.
    fn drain(input: &[u8], chunk: usize) -> (Vec<u8>, usize) {
        let mut session = BrotliCodec.open().unwrap();
        let mut in_pos = 0;
        let mut out = vec![0u8; chunk];
        let mut out_pos = 0;
        let mut collected = Vec::new();
        let mut refills = 0;
        loop {
            match session.advance(input, &mut in_pos, &mut out, &mut out_pos) {
                Progress::NeedsMoreOutput => {
                    collected.extend_from_slice(&out[..out_pos]);
                    out_pos = 0;
                    refills += 1;
                }
                Progress::Done => {
                    collected.extend_from_slice(&out[..out_pos]);
                    return (collected, refills);
                }
                Progress::Error(e) => panic!("unexpected codec error: {e}"),
            }
        }
    }

    #[test]
    fn decodes_in_one_call_when_output_fits() {
        let data = b"hello brotli ".repeat(32);
        let (out, refills) = drain(&compress(&data), data.len());
        assert_eq!(out, data);
        assert_eq!(refills, 0);
    }

    #[test]
    fn reports_needs_more_output_when_buffer_is_small() {
        let data = b"abcdefgh".repeat(1024);
        let (out, refills) = drain(&compress(&data), 100);
        assert_eq!(out, data);
        assert!(refills >= data.len() / 100 - 1, "refills = {refills}");
    }

    #[test]
    fn total_out_tracks_produced_bytes() {
        let data = vec![7u8; 5000];
        let input = compress(&data);
        let mut session = BrotliSession::new();
        let mut in_pos = 0;
        let mut out = vec![0u8; 8000];
        let mut out_pos = 0;
        let progress = session.advance(&input, &mut in_pos, &mut out, &mut out_pos);
        assert!(matches!(progress, Progress::Done));
        assert_eq!(session.total_out(), 5000);
        assert_eq!(out_pos, 5000);
        assert_eq!(in_pos, input.len());
    }

    #[test]
    fn truncated_stream_is_reported() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * 31 % 251) as u8).collect();
        let input = compress(&data);
        let cut = &input[..input.len() / 2];
        let mut session = BrotliSession::new();
        let mut in_pos = 0;
        let mut out = vec![0u8; data.len() * 2];
        let mut out_pos = 0;
        let progress = session.advance(cut, &mut in_pos, &mut out, &mut out_pos);
        assert!(matches!(
            progress,
            Progress::Error(CodecError::Truncated { codec: "brotli", .. })
        ));
    }

    #[test]
    fn reserved_bit_is_rejected() {
        // WBITS=16, ISLAST=0, MNIBBLES=3 (metadata), reserved bit set.
        let garbage = [0x1Cu8, 0x00, 0x00, 0x00];
        let mut session = BrotliSession::new();
        let mut in_pos = 0;
        let mut out = vec![0u8; 1024];
        let mut out_pos = 0;
        let progress = session.advance(&garbage, &mut in_pos, &mut out, &mut out_pos);
        assert!(matches!(progress, Progress::Error(CodecError::Corrupt { .. })));
    }

    #[test]
    fn empty_stream_decodes_to_nothing() {
        let input = compress(b"");
        let (out, _) = drain(&input, 16);
        assert!(out.is_empty());
    }
}
