use zstd::stream::raw::{Decoder, InBuffer, Operation, OutBuffer};

use crate::codec::{Codec, DecoderSession, Progress};
use crate::error::CodecError;

const NAME: &str = "zstd";

/// Zstandard codec backed by the `zstd` crate's raw streaming API.
///
/// Only the first frame of the payload is decoded; bytes after it are
/// left unconsumed, matching how the Brotli session treats trailing data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZstdCodec;

impl Codec for ZstdCodec {
    type Session = ZstdSession;

    fn name(&self) -> &'static str {
        NAME
    }

    fn open(&self) -> Result<ZstdSession, CodecError> {
        let raw = Decoder::new().map_err(|e| CodecError::Init {
            codec: NAME,
            detail: e.to_string(),
        })?;
        Ok(ZstdSession { raw })
    }
}

/// A zstd decompression context (`ZSTD_DCtx`), freed on drop.
pub struct ZstdSession {
    raw: Decoder<'static>,
}

impl DecoderSession for ZstdSession {
    fn advance(
        &mut self,
        input: &[u8],
        in_pos: &mut usize,
        output: &mut [u8],
        out_pos: &mut usize,
    ) -> Progress {
        loop {
            let mut src = InBuffer::around(&input[*in_pos..]);
            let mut dst = OutBuffer::around_pos(&mut *output, *out_pos);

            let hint = match self.raw.run(&mut src, &mut dst) {
                Ok(hint) => hint,
                Err(e) => {
                    return Progress::Error(CodecError::Corrupt {
                        codec: NAME,
                        consumed: *in_pos + src.pos,
                        detail: e.to_string(),
                    });
                }
            };

            *in_pos += src.pos;
            *out_pos = dst.pos();

            // A zero hint means the frame is decoded and fully flushed.
            if hint == 0 {
                return Progress::Done;
            }
            if *out_pos == output.len() {
                return Progress::NeedsMoreOutput;
            }
            if *in_pos == input.len() {
                return Progress::Error(CodecError::Truncated {
                    codec: NAME,
                    consumed: *in_pos,
                });
            }
        }
    }
}
