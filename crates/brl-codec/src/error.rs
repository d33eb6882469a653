/// Errors reported by a streaming codec session.
///
/// A codec only ever reports one of these as the terminal outcome of a
/// session. The engine above it maps all of them onto its own taxonomy,
/// so the variants here exist to carry diagnostics, not to drive control
/// flow.
///
/// ```text
///   CodecError
///   ├── Init       ← decoder state could not be created
///   ├── Corrupt    ← the codec rejected the stream
///   └── Truncated  ← all input was consumed before the stream ended
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The decoder state could not be created.
    ///
    /// Brotli sessions are infallible to create; zstd allocates a
    /// context through the C library and may fail here.
    #[error("failed to create {codec} decoder: {detail}")]
    Init { codec: &'static str, detail: String },

    /// The stream violates the codec's format.
    #[error("{codec} stream is corrupt (rejected after {consumed} input bytes): {detail}")]
    Corrupt {
        codec: &'static str,
        consumed: usize,
        detail: String,
    },

    /// The codec asked for more input after the whole payload was fed.
    #[error("{codec} stream is truncated: input exhausted after {consumed} bytes")]
    Truncated { codec: &'static str, consumed: usize },
}
