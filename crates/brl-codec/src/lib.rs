#![warn(clippy::pedantic)]

pub mod codec;
pub mod decode_brotli;
pub mod decode_zstd;
pub mod error;
pub mod kind;

pub use codec::{Codec, DecoderSession, Progress};
pub use decode_brotli::{BrotliCodec, BrotliSession};
pub use decode_zstd::{ZstdCodec, ZstdSession};
pub use error::CodecError;
pub use kind::{AnySession, CodecKind, UnknownCodec};
