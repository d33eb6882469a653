use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use brl_codec::{BrotliCodec, Codec, CodecKind};
use brl_engine::{Classify, Decompressor, ErrorKind, ResultSlot};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::cancel::CancelSignal;
use crate::config::TransferConfig;
use crate::error::TransferError;
use crate::fetch::{Fetch, LocatorFetcher};
use crate::notify::{Completion, Notifier};
use crate::state::TransferState;

/// Download, decompress, publish, notify.
///
/// One orchestrator drives one operation at a time; concurrent calls to
/// [`run`](Self::run) queue behind each other. The result of every
/// operation lands in the shared [`ResultSlot`] before the notifier is
/// called, and the notifier is called exactly once per operation.
///
/// ```text
///   run(locator)
///     │ reset slot
///     ├─ empty locator ─────────────────────────────► Failed ──────┐
///     ▼                                                             │
///   fetch ──┬─ error / cancel / empty ──────────────► DownloadFailed┤
///           ▼                                                       │
///   spawn_blocking(decompress) ──► publish ──► Succeeded | Failed ──┤
///                                                                   ▼
///                                                        notify(Completion)
/// ```
pub struct Orchestrator<F, C = BrotliCodec> {
    fetcher: F,
    engine: Decompressor<C>,
    slot: Arc<ResultSlot>,
    state: Mutex<TransferState>,
    running: tokio::sync::Mutex<()>,
}

impl Orchestrator<LocatorFetcher, CodecKind> {
    /// Orchestrator for HTTP(S) and file locators built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::Config`] for unusable limits and
    /// [`TransferError::Client`] if the HTTP client cannot be built.
    pub fn from_config(
        config: &TransferConfig,
        slot: Arc<ResultSlot>,
    ) -> Result<Self, TransferError> {
        let engine = Decompressor::with_codec(config.codec).with_limits(config.limits)?;
        let fetcher = LocatorFetcher::from_config(config)?;
        Ok(Self::new(fetcher, engine, slot))
    }
}

impl<F, C> Orchestrator<F, C>
where
    F: Fetch,
    C: Codec + Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(fetcher: F, engine: Decompressor<C>, slot: Arc<ResultSlot>) -> Self {
        Self {
            fetcher,
            engine,
            slot,
            state: Mutex::new(TransferState::Idle),
            running: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn slot(&self) -> &Arc<ResultSlot> {
        &self.slot
    }

    #[must_use]
    pub fn engine(&self) -> &Decompressor<C> {
        &self.engine
    }

    #[must_use]
    pub fn state(&self) -> TransferState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: TransferState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.can_transition_to(next) {
            debug!(from = %*state, to = %next, "transfer state");
        } else {
            // A previous run was dropped mid-flight.
            warn!(from = %*state, to = %next, "transfer state forced");
        }
        *state = next;
    }

    /// Run one complete operation for `locator`.
    ///
    /// Cancelling `cancel` before the download completes ends the
    /// operation as [`TransferState::DownloadFailed`]; once
    /// decompression has started it runs to completion.
    pub async fn run<N>(&self, locator: &str, notifier: &N, mut cancel: CancelSignal) -> Completion
    where
        N: Notifier + ?Sized,
    {
        let _running = self.running.lock().await;
        self.slot.reset();

        let locator = locator.trim();
        if locator.is_empty() {
            self.set_state(TransferState::Failed);
            return self.fail(&TransferError::EmptyLocator, 0.0, 0.0, notifier);
        }

        self.set_state(TransferState::Downloading);
        let started = Instant::now();
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(TransferError::Cancelled),
            res = self.fetcher.fetch(locator, self.engine.limits()) => res,
        };
        let download_ms = millis(started.elapsed());

        let payload = match fetched {
            Ok(payload) if payload.is_empty() => Err(TransferError::EmptyPayload {
                locator: locator.to_owned(),
            }),
            other => other,
        };
        let payload = match payload {
            Ok(payload) => payload,
            Err(e) => {
                self.set_state(TransferState::DownloadFailed);
                return self.fail(&e, download_ms, 0.0, notifier);
            }
        };

        self.set_state(TransferState::Decompressing);
        let started = Instant::now();
        let published = self.decompress_and_publish(payload).await;
        let decompress_ms = millis(started.elapsed());

        let completion = match published {
            Ok(size) => {
                self.set_state(TransferState::Succeeded);
                info!(locator, size, download_ms, decompress_ms, "transfer complete");
                Completion {
                    download_ms,
                    decompress_ms,
                    size,
                    error_code: 0,
                }
            }
            Err(kind) => {
                self.set_state(TransferState::Failed);
                Completion {
                    download_ms,
                    decompress_ms,
                    size: 0,
                    error_code: kind.code(),
                }
            }
        };
        notifier.notify(&completion);
        completion
    }

    /// Decompress `input` straight into the slot, without a transfer.
    ///
    /// Waits for any operation in flight so that the two never write the
    /// slot at the same time. The transfer state is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorKind`] that was recorded in the slot.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    pub fn decompress_blocking(&self, input: &[u8]) -> Result<usize, ErrorKind> {
        let _running = self.running.blocking_lock();
        self.engine.decompress_into(input, &self.slot)
    }

    async fn decompress_and_publish(&self, payload: Bytes) -> Result<usize, ErrorKind> {
        let engine = self.engine.clone();
        let joined = tokio::task::spawn_blocking(move || engine.decompress(&payload)).await;
        match joined {
            Ok(result) => self.slot.publish(result),
            Err(join) => {
                let err = TransferError::Worker(join.to_string());
                let kind = err.kind();
                self.slot.record_failure(kind, &err.to_string());
                Err(kind)
            }
        }
    }

    fn fail<N>(
        &self,
        err: &TransferError,
        download_ms: f64,
        decompress_ms: f64,
        notifier: &N,
    ) -> Completion
    where
        N: Notifier + ?Sized,
    {
        let kind = err.kind();
        warn!(state = %self.state(), error = %err, "transfer failed");
        self.slot.record_failure(kind, &err.to_string());
        let completion = Completion {
            download_ms,
            decompress_ms,
            size: 0,
            error_code: kind.code(),
        };
        notifier.notify(&completion);
        completion
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
