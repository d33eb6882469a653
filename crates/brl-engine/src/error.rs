use std::fmt;

use brl_codec::CodecError;

use crate::arena::ArenaError;

/// Host-visible error taxonomy.
///
/// Every failure anywhere in the stack is classified into exactly one of
/// these kinds before it reaches Result State. The integer codes are the
/// boundary contract: hosts compare `get_error_code()` against them, and
/// `0` always means success.
///
/// ```text
/// ┌──────┬────────────────────────────┬───────────────────────────────────┐
/// │ Code │ Kind                       │ Condition                         │
/// ├──────┼────────────────────────────┼───────────────────────────────────┤
/// │ 1    │ InvalidInput               │ empty payload or locator          │
/// │ 2    │ InputTooLarge              │ payload above the input ceiling   │
/// │ 3    │ AllocationFailure          │ buffer or decoder allocation      │
/// │ 4    │ DecompressionLimitExceeded │ output above the output ceiling   │
/// │ 5    │ DecompressionFailed        │ corrupt or truncated stream       │
/// │ 6    │ EmptyOutput                │ codec produced zero bytes         │
/// │ 7    │ DownloadFailed             │ status, transport, cancellation   │
/// └──────┴────────────────────────────┴───────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    InvalidInput = 1,
    InputTooLarge = 2,
    AllocationFailure = 3,
    DecompressionLimitExceeded = 4,
    DecompressionFailed = 5,
    EmptyOutput = 6,
    DownloadFailed = 7,
}

impl ErrorKind {
    pub const ALL: [Self; 7] = [
        Self::InvalidInput,
        Self::InputTooLarge,
        Self::AllocationFailure,
        Self::DecompressionLimitExceeded,
        Self::DecompressionFailed,
        Self::EmptyOutput,
        Self::DownloadFailed,
    ];

    /// The stable integer code reported across the host boundary.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Inverse of [`code`](Self::code). `0` and unknown codes map to `None`.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::InputTooLarge => "InputTooLarge",
            Self::AllocationFailure => "AllocationFailure",
            Self::DecompressionLimitExceeded => "DecompressionLimitExceeded",
            Self::DecompressionFailed => "DecompressionFailed",
            Self::EmptyOutput => "EmptyOutput",
            Self::DownloadFailed => "DownloadFailed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that map onto the host taxonomy.
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// Errors that can occur while decompressing one payload.
///
/// ```text
///   DecompressError
///   ├── EmptyInput        ← zero-length payload              (InvalidInput)
///   ├── InputTooLarge     ← payload above max_input          (InputTooLarge)
///   ├── Allocation        ← allocator refused a buffer       (AllocationFailure)
///   ├── LimitExceeded     ← doubling would pass max_output   (DecompressionLimitExceeded)
///   ├── Codec(CodecError) ← corrupt/truncated, or init fail  (DecompressionFailed / AllocationFailure)
///   └── EmptyOutput       ← stream decoded to zero bytes     (EmptyOutput)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecompressError {
    #[error("compressed input is empty")]
    EmptyInput,

    #[error("compressed input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },

    #[error("failed to allocate a {requested}-byte output buffer")]
    Allocation { requested: usize },

    /// The stream needs more output than the ceiling allows.
    ///
    /// `capacity` is the largest buffer that was actually allocated;
    /// `requested` is the doubled size that was refused.
    #[error(
        "decompression limit exceeded: growing {capacity} to {requested} bytes passes the {ceiling}-byte ceiling"
    )]
    LimitExceeded {
        capacity: usize,
        requested: usize,
        ceiling: usize,
    },

    #[error("decompression failed: {0}")]
    Codec(#[from] CodecError),

    #[error("stream decoded successfully but produced no output")]
    EmptyOutput,
}

impl Classify for DecompressError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::InvalidInput,
            Self::InputTooLarge { .. } => ErrorKind::InputTooLarge,
            Self::Allocation { .. } | Self::Codec(CodecError::Init { .. }) => {
                ErrorKind::AllocationFailure
            }
            Self::LimitExceeded { .. } => ErrorKind::DecompressionLimitExceeded,
            Self::Codec(_) => ErrorKind::DecompressionFailed,
            Self::EmptyOutput => ErrorKind::EmptyOutput,
        }
    }
}

impl From<ArenaError> for DecompressError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::Allocation { requested } => Self::Allocation { requested },
            ArenaError::CeilingExceeded {
                capacity,
                requested,
                ceiling,
            } => Self::LimitExceeded {
                capacity,
                requested,
                ceiling,
            },
        }
    }
}
