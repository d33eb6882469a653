use crate::error::CodecError;

/// Outcome of a single [`DecoderSession::advance`] call.
///
/// ```text
/// ┌─────────────────┬─────────────────────────────────────────────────┐
/// │ Variant         │ Caller reaction                                 │
/// ├─────────────────┼─────────────────────────────────────────────────┤
/// │ NeedsMoreOutput │ Grow the output buffer and call advance again   │
/// │ Done            │ Stream finished; output cursor is final length  │
/// │ Error           │ Terminal; discard everything written so far     │
/// └─────────────────┴─────────────────────────────────────────────────┘
/// ```
///
/// There is no "needs more input" outcome: the engine always
/// hands the codec the entire compressed payload, so a codec that runs dry
/// reports [`CodecError::Truncated`] instead.
#[derive(Debug)]
#[must_use]
pub enum Progress {
    NeedsMoreOutput,
    Done,
    Error(CodecError),
}

/// Streaming decoder state for exactly one compressed stream.
///
/// Sessions release their native resources in `Drop`, so an engine that
/// bails out early through `?` never leaks a decoder.
pub trait DecoderSession {
    /// Decode from `input[*in_pos..]` into `output[*out_pos..]`.
    ///
    /// Both cursors are advanced past the bytes consumed and produced.
    /// The caller may pass a different (larger) `output` slice on the next
    /// call as long as `output[..*out_pos]` still holds the bytes produced
    /// so far.
    fn advance(
        &mut self,
        input: &[u8],
        in_pos: &mut usize,
        output: &mut [u8],
        out_pos: &mut usize,
    ) -> Progress;
}

/// A decompression algorithm that can open fresh sessions.
pub trait Codec {
    type Session: DecoderSession;

    /// Short lowercase codec name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Create a new decoder session.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Init`] if the decoder state cannot be
    /// allocated.
    fn open(&self) -> Result<Self::Session, CodecError>;
}
