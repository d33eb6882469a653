use std::fmt;

/// Where an orchestrated operation currently is.
///
/// ```text
///                 ┌──────────────── empty locator ───────────────┐
///                 │                                              ▼
///   ┌──────┐  start  ┌─────────────┐  payload  ┌───────────────┐ ┌────────┐
///   │ Idle │ ──────► │ Downloading │ ────────► │ Decompressing │►│ Failed │
///   └──────┘         └──────┬──────┘           └───────┬───────┘ └────────┘
///                           │ status / transport /     │ ok
///                           │ cancel / empty / large   ▼
///                           ▼                    ┌───────────┐
///                   ┌────────────────┐           │ Succeeded │
///                   │ DownloadFailed │           └───────────┘
///                   └────────────────┘
/// ```
///
/// Terminal states accept a new start, so one orchestrator can run any
/// number of operations back to back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransferState {
    #[default]
    Idle,
    Downloading,
    Decompressing,
    Succeeded,
    Failed,
    DownloadFailed,
}

impl TransferState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::DownloadFailed)
    }

    /// Whether `self → next` is an edge of the state machine.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use TransferState::{Decompressing, DownloadFailed, Downloading, Failed, Idle, Succeeded};

        let ready = self == Idle || self.is_terminal();
        match next {
            Downloading => ready,
            Decompressing | DownloadFailed => self == Downloading,
            Succeeded => self == Decompressing,
            Failed => ready || self == Decompressing,
            Idle => false,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Decompressing => "decompressing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::DownloadFailed => "download-failed",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
