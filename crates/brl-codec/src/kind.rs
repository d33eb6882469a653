use std::fmt;
use std::str::FromStr;

use crate::codec::{Codec, DecoderSession, Progress};
use crate::decode_brotli::{BrotliCodec, BrotliSession};
use crate::decode_zstd::{ZstdCodec, ZstdSession};
use crate::error::CodecError;

/// Runtime codec selection.
///
/// Hosts that pick the codec from configuration (the CLI's `--codec`
/// flag) use this instead of naming a concrete codec type.
///
/// ```text
/// ┌────────┬──────────────────────────────────┐
/// │ Kind   │ Backend                          │
/// ├────────┼──────────────────────────────────┤
/// │ Brotli │ brotli-decompressor (default)    │
/// │ Zstd   │ zstd raw streaming decoder       │
/// └────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CodecKind {
    #[default]
    Brotli,
    Zstd,
}

impl Codec for CodecKind {
    type Session = AnySession;

    fn name(&self) -> &'static str {
        match self {
            Self::Brotli => BrotliCodec.name(),
            Self::Zstd => ZstdCodec.name(),
        }
    }

    fn open(&self) -> Result<AnySession, CodecError> {
        match self {
            Self::Brotli => BrotliCodec.open().map(AnySession::Brotli),
            Self::Zstd => ZstdCodec.open().map(AnySession::Zstd),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown codec name.
#[derive(Debug, thiserror::Error)]
#[error("unknown codec {0:?}, expected brotli|zstd")]
pub struct UnknownCodec(pub String);

impl FromStr for CodecKind {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "brotli" | "br" => Ok(Self::Brotli),
            "zstd" | "zst" => Ok(Self::Zstd),
            _ => Err(UnknownCodec(s.to_owned())),
        }
    }
}

/// Session for whichever codec a [`CodecKind`] selected.
pub enum AnySession {
    Brotli(BrotliSession),
    Zstd(ZstdSession),
}

impl DecoderSession for AnySession {
    fn advance(
        &mut self,
        input: &[u8],
        in_pos: &mut usize,
        output: &mut [u8],
        out_pos: &mut usize,
    ) -> Progress {
        match self {
            Self::Brotli(s) => s.advance(input, in_pos, output, out_pos),
            Self::Zstd(s) => s.advance(input, in_pos, output, out_pos),
        }
    }
}
