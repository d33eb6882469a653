//! C ABI over the brotload engine.
//!
//! One process-wide result slot backs every export. Downloads run on a
//! private tokio runtime; the host learns about completion through the
//! callback registered with [`set_completion_callback`].
//!
//! ```text
//!   host ── start_download(locator) ──► runtime task ──► Orchestrator::run
//!     ▲                                                        │
//!     └──── callback(download_ms, decompress_ms, size, code) ◄─┘
//!
//!   host ── get_result_data / get_result_size / get_error_* ──► RESULT
//! ```
//!
//! Pointers handed out by [`get_result_data`] and [`get_error_message`]
//! stay valid until the next call that changes the result: another
//! download or decompression, [`init_module`], or [`free_resources`].
//!
//! No export lets a panic unwind into the caller.

#![warn(clippy::pedantic)]

use std::ffi::{CStr, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use brl_codec::CodecKind;
use brl_engine::{Decompressor, ErrorKind, ResultSlot};
use brl_transfer::{
    CancelHandle, Completion, LocatorFetcher, Notifier, Orchestrator, TransferConfig,
    cancel_pair,
};
use tokio::runtime::{self, Runtime};
use tracing::{debug, error};

/// Host completion hook: `(download_ms, decompress_ms, size, error_code)`.
pub type CompletionCallback = extern "C" fn(f64, f64, usize, i32);

static RESULT: LazyLock<Arc<ResultSlot>> = LazyLock::new(|| Arc::new(ResultSlot::new()));

static CALLBACK: Mutex<Option<CompletionCallback>> = Mutex::new(None);

static PENDING: Mutex<Option<CancelHandle>> = Mutex::new(None);

static HOST: LazyLock<Result<Host, String>> = LazyLock::new(Host::build);

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Host runtime ────────────────────────────────────────────────────────

struct Host {
    runtime: Runtime,
    orchestrator: Arc<Orchestrator<LocatorFetcher, CodecKind>>,
}

impl Host {
    fn build() -> Result<Self, String> {
        let runtime = runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("brotload-transfer")
            .enable_all()
            .build()
            .map_err(|e| format!("cannot start transfer runtime: {e}"))?;
        let orchestrator =
            Orchestrator::from_config(&TransferConfig::default(), Arc::clone(&RESULT))
                .map_err(|e| e.to_string())?;
        debug!("transfer host ready");
        Ok(Self {
            runtime,
            orchestrator: Arc::new(orchestrator),
        })
    }
}

/// Forwards completions to the registered C callback, if any.
struct HostCallback;

impl Notifier for HostCallback {
    fn notify(&self, completion: &Completion) {
        let callback = *lock(&CALLBACK);
        if let Some(callback) = callback {
            callback(
                completion.download_ms,
                completion.decompress_ms,
                completion.size,
                completion.error_code,
            );
        }
    }
}

/// Record `kind` as the result and tell the host, without any transfer.
fn fail_fast(kind: ErrorKind, message: &str) {
    RESULT.reset();
    RESULT.record_failure(kind, message);
    HostCallback.notify(&Completion {
        download_ms: 0.0,
        decompress_ms: 0.0,
        size: 0,
        error_code: kind.code(),
    });
}

/// Run `f`, turning a panic into `fallback`.
fn guard<R>(fallback: R, f: impl FnOnce() -> R) -> R {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!("panic caught at the C boundary");
        fallback
    })
}

// ── Exports ─────────────────────────────────────────────────────────────

/// Clear the result and start the transfer runtime ahead of the first
/// download. Safe to call any number of times.
#[unsafe(no_mangle)]
pub extern "C" fn init_module() {
    guard((), || {
        RESULT.reset();
        if let Err(e) = &*HOST {
            error!("{e}");
        }
    });
}

/// Register (or, with null, clear) the completion callback.
#[unsafe(no_mangle)]
pub extern "C" fn set_completion_callback(callback: Option<CompletionCallback>) {
    guard((), || *lock(&CALLBACK) = callback);
}

/// Begin downloading and decompressing `locator` in the background.
///
/// The previous result is cleared before this returns, and a download
/// already in flight is cancelled. A null, empty or
/// non-UTF-8 locator fails immediately with `InvalidInput`; the
/// callback still fires once.
///
/// # Safety
///
/// `locator` must be null or point to a NUL-terminated string that
/// stays valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn start_download(locator: *const c_char) {
    let locator = if locator.is_null() {
        Ok(String::new())
    } else {
        // SAFETY: non-null and NUL-terminated per the contract above.
        unsafe { CStr::from_ptr(locator) }
            .to_str()
            .map(str::to_owned)
    };

    guard((), move || {
        let Ok(locator) = locator else {
            fail_fast(ErrorKind::InvalidInput, "download locator is not valid UTF-8");
            return;
        };

        let host = match &*HOST {
            Ok(host) => host,
            Err(e) => {
                fail_fast(ErrorKind::DownloadFailed, e);
                return;
            }
        };

        let (handle, signal) = cancel_pair();
        if let Some(previous) = lock(&PENDING).replace(handle) {
            debug!("cancelling pending download");
            previous.cancel();
        }
        RESULT.reset();

        let orchestrator = Arc::clone(&host.orchestrator);
        host.runtime.spawn(async move {
            orchestrator.run(&locator, &HostCallback, signal).await;
        });
    });
}

/// Cancel the download in flight, if any. Has no effect once
/// decompression has started.
#[unsafe(no_mangle)]
pub extern "C" fn cancel_download() {
    guard((), || {
        if let Some(pending) = lock(&PENDING).take() {
            pending.cancel();
        }
    });
}

/// Decompress `len` bytes at `data` synchronously into the result slot.
///
/// Returns `0` on success or the error code; the callback is not used.
/// A download in flight finishes before the decompression starts, unless
/// this is called from inside the completion callback.
///
/// # Safety
///
/// Unless `len` is `0`, `data` must be null or point to `len` readable
/// bytes that stay valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn decompress_buffer(data: *const u8, len: usize) -> i32 {
    let input: &[u8] = if data.is_null() || len == 0 {
        &[]
    } else {
        // SAFETY: non-null and `len` readable bytes per the contract above.
        unsafe { std::slice::from_raw_parts(data, len) }
    };

    guard(ErrorKind::DecompressionFailed.code(), || {
        let in_callback = tokio::runtime::Handle::try_current().is_ok();
        let published = match &*HOST {
            Ok(host) if !in_callback => host.orchestrator.decompress_blocking(input),
            _ => Decompressor::with_codec(CodecKind::Brotli).decompress_into(input, &RESULT),
        };
        match published {
            Ok(_) => 0,
            Err(kind) => kind.code(),
        }
    })
}

/// Pointer to the decompressed bytes, or null when there are none.
#[unsafe(no_mangle)]
pub extern "C" fn get_result_data() -> *const u8 {
    guard(std::ptr::null(), || RESULT.raw_data().0)
}

/// Length of the decompressed bytes, `0` when there are none.
#[unsafe(no_mangle)]
pub extern "C" fn get_result_size() -> usize {
    guard(0, || RESULT.size())
}

/// NUL-terminated message of the last failure, empty on success.
#[unsafe(no_mangle)]
pub extern "C" fn get_error_message() -> *const c_char {
    guard(c"".as_ptr(), || RESULT.raw_error_message())
}

/// Code of the last failure, `0` on success or when nothing ran.
#[unsafe(no_mangle)]
pub extern "C" fn get_error_code() -> i32 {
    guard(0, || RESULT.error_code())
}

/// Release the current result. Safe to call any number of times.
#[unsafe(no_mangle)]
pub extern "C" fn free_resources() {
    guard((), || RESULT.reset());
}
