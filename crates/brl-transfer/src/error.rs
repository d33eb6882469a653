use std::path::PathBuf;

use brl_engine::{Classify, ErrorKind, LimitsError};

/// Errors raised by the transfer layer before the engine gets involved.
///
/// ```text
///   TransferError
///   ├── EmptyLocator  ← start called with an empty locator   (InvalidInput)
///   ├── EmptyPayload  ← download succeeded with zero bytes   (InvalidInput)
///   ├── Config        ← limits failed validation             (InvalidInput)
///   ├── TooLarge      ← announced or received size too big   (InputTooLarge)
///   ├── Status        ← non-2xx HTTP status                  (DownloadFailed)
///   ├── Transport     ← connect/TLS/timeout/body read error  (DownloadFailed)
///   ├── Io            ← local file could not be read         (DownloadFailed)
///   ├── Client        ← HTTP client could not be built       (DownloadFailed)
///   ├── Cancelled     ← cancelled before the download ended  (DownloadFailed)
///   └── Worker        ← decompression task panicked          (DecompressionFailed)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("download locator is empty")]
    EmptyLocator,

    #[error("download of {locator} returned no data")]
    EmptyPayload { locator: String },

    #[error(transparent)]
    Config(#[from] LimitsError),

    #[error("payload is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: usize },

    #[error("download of {locator} failed with HTTP status {status}")]
    Status { locator: String, status: u16 },

    #[error("download of {locator} failed: {detail}")]
    Transport { locator: String, detail: String },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("transfer cancelled")]
    Cancelled,

    #[error("decompression worker failed: {0}")]
    Worker(String),
}

impl Classify for TransferError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyLocator | Self::EmptyPayload { .. } | Self::Config(_) => {
                ErrorKind::InvalidInput
            }
            Self::TooLarge { .. } => ErrorKind::InputTooLarge,
            Self::Status { .. }
            | Self::Transport { .. }
            | Self::Io { .. }
            | Self::Client(_)
            | Self::Cancelled => ErrorKind::DownloadFailed,
            Self::Worker(_) => ErrorKind::DecompressionFailed,
        }
    }
}
