//! Download collaborators.
//!
//! A [`Fetch`] turns a locator into the full compressed payload. The
//! orchestrator only ever sees `Result<Bytes, TransferError>`; it does
//! not care whether the bytes came over HTTP or from disk.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use brl_engine::Limits;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use tracing::debug;

use crate::config::TransferConfig;
use crate::error::TransferError;

/// Something that can retrieve a compressed payload.
pub trait Fetch: Send + Sync {
    /// Retrieve the payload named by `locator`.
    ///
    /// Implementations must refuse payloads larger than
    /// `limits.max_input` with [`TransferError::TooLarge`], as early as
    /// they can tell.
    fn fetch(
        &self,
        locator: &str,
        limits: &Limits,
    ) -> impl Future<Output = Result<Bytes, TransferError>> + Send;
}

fn input_limit(limits: &Limits) -> u64 {
    u64::try_from(limits.max_input).unwrap_or(u64::MAX)
}

// ── HTTP ────────────────────────────────────────────────────────────────

/// `GET` over HTTP(S) with reqwest.
///
/// Any non-2xx status is a failure. A `Content-Length` above the input
/// limit is refused before the body is read; bodies without one are
/// cut off as soon as they pass it.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`TransferError::Client`] if the TLS backend or client
    /// cannot be initialised.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, TransferError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransferError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn from_config(config: &TransferConfig) -> Result<Self, TransferError> {
        Self::new(config.timeout, &config.user_agent)
    }
}

fn transport(locator: &str, err: &reqwest::Error) -> TransferError {
    TransferError::Transport {
        locator: locator.to_owned(),
        detail: err.to_string(),
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, locator: &str, limits: &Limits) -> Result<Bytes, TransferError> {
        let mut response = self
            .client
            .get(locator)
            .send()
            .await
            .map_err(|e| transport(locator, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                locator: locator.to_owned(),
                status: status.as_u16(),
            });
        }

        let announced = response.content_length();
        if let Some(size) = announced
            && size > input_limit(limits)
        {
            return Err(TransferError::TooLarge {
                size,
                limit: limits.max_input,
            });
        }

        let mut body = BytesMut::with_capacity(limits.transfer_capacity(announced));
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport(locator, &e))?
        {
            let received = body.len() + chunk.len();
            if received > limits.max_input {
                return Err(TransferError::TooLarge {
                    size: u64::try_from(received).unwrap_or(u64::MAX),
                    limit: limits.max_input,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(locator, size = body.len(), status = status.as_u16(), "http download finished");
        Ok(body.freeze())
    }
}

// ── Local files ─────────────────────────────────────────────────────────

/// Reads a local file. Accepts plain paths and `file://` locators.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_of(locator: &str) -> PathBuf {
        PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
    }
}

impl Fetch for FileFetcher {
    async fn fetch(&self, locator: &str, limits: &Limits) -> Result<Bytes, TransferError> {
        let path = Self::path_of(locator);
        let io = |source| TransferError::Io {
            path: path.clone(),
            source,
        };

        let size = tokio::fs::metadata(&path).await.map_err(io)?.len();
        if size > input_limit(limits) {
            return Err(TransferError::TooLarge {
                size,
                limit: limits.max_input,
            });
        }

        let data = tokio::fs::read(&path).await.map_err(io)?;
        // The file may have grown between the two calls.
        if data.len() > limits.max_input {
            return Err(TransferError::TooLarge {
                size: u64::try_from(data.len()).unwrap_or(u64::MAX),
                limit: limits.max_input,
            });
        }

        debug!(path = %path.display(), size = data.len(), "file read");
        Ok(Bytes::from(data))
    }
}

// ── Dispatch ────────────────────────────────────────────────────────────

/// Picks [`HttpFetcher`] for `http://` and `https://` locators and
/// [`FileFetcher`] for `file://` locators and bare paths.
#[derive(Clone, Debug)]
pub struct LocatorFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

/// How a locator will be fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scheme {
    Http,
    File,
    Unsupported,
}

fn scheme_of(locator: &str) -> Scheme {
    let Some((scheme, _)) = locator.split_once("://") else {
        return Scheme::File;
    };
    if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") {
        Scheme::Http
    } else if scheme.eq_ignore_ascii_case("file") {
        Scheme::File
    } else {
        Scheme::Unsupported
    }
}

impl LocatorFetcher {
    #[must_use]
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher,
        }
    }

    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn from_config(config: &TransferConfig) -> Result<Self, TransferError> {
        HttpFetcher::from_config(config).map(Self::new)
    }
}

impl Fetch for LocatorFetcher {
    async fn fetch(&self, locator: &str, limits: &Limits) -> Result<Bytes, TransferError> {
        match scheme_of(locator) {
            Scheme::Http => self.http.fetch(locator, limits).await,
            Scheme::File => self.file.fetch(locator, limits).await,
            Scheme::Unsupported => Err(TransferError::Transport {
                locator: locator.to_owned(),
                detail: "unsupported locator scheme".to_owned(),
            }),
        }
    }
}
