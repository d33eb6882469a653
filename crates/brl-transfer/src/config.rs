use std::time::Duration;

use brl_codec::CodecKind;
use brl_engine::{Limits, LimitsError};

/// Default whole-request timeout for HTTP downloads.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default `User-Agent` sent by [`HttpFetcher`](crate::HttpFetcher).
pub const DEFAULT_USER_AGENT: &str = concat!("brotload/", env!("CARGO_PKG_VERSION"));

/// Configuration for one [`Orchestrator`](crate::Orchestrator).
///
/// ```text
/// ┌────────────┬──────────────────┬────────────────────────────────────┐
/// │ Field      │ Default          │ Effect                             │
/// ├────────────┼──────────────────┼────────────────────────────────────┤
/// │ limits     │ Limits::default  │ engine and download size limits    │
/// │ timeout    │ 60 s             │ whole HTTP request, body included  │
/// │ user_agent │ brotload/<ver>   │ HTTP User-Agent header             │
/// │ codec      │ Brotli           │ decoder applied to the payload     │
/// └────────────┴──────────────────┴────────────────────────────────────┘
/// ```
#[derive(Clone, Debug)]
pub struct TransferConfig {
    pub limits: Limits,
    pub timeout: Duration,
    pub user_agent: String,
    pub codec: CodecKind,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            codec: CodecKind::default(),
        }
    }
}

impl TransferConfig {
    /// # Errors
    ///
    /// Returns [`LimitsError`] if the embedded limits are unusable.
    pub fn validate(&self) -> Result<(), LimitsError> {
        self.limits.validate()
    }
}
