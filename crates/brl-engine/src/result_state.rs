use std::ffi::{CStr, c_char};
use std::fmt::Display;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::engine::Decompressed;
use crate::error::{Classify, ErrorKind};
use crate::message::BoundedMessage;

/// What the result slot currently holds.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing published since the last reset.
    #[default]
    Empty,
    /// A complete, non-empty decompressed buffer.
    Success(Vec<u8>),
    /// The last operation failed.
    Failure {
        kind: ErrorKind,
        message: BoundedMessage,
    },
}

/// The single-slot "last result" holder.
///
/// One operation at a time writes here; any number of readers may look.
/// Every mutation (reset, publish, failure) takes the lock exactly once,
/// so a reader sees either the previous outcome or the new one, never a
/// freed-but-not-yet-repopulated slot.
///
/// ```text
///   ┌───────┐  publish_success   ┌─────────┐
///   │ Empty │ ─────────────────► │ Success │
///   └───────┘ ◄───── reset ───── └─────────┘
///       │  ▲                         │
///       │  └────── reset ─────┐      │ record_failure
///       ▼ record_failure      │      ▼
///   ┌─────────────────────────┴──────────┐
///   │               Failure              │
///   └────────────────────────────────────┘
/// ```
///
/// Publishing always replaces the previous outcome; the old buffer is
/// released after the lock is dropped.
#[derive(Debug, Default)]
pub struct ResultSlot {
    inner: Mutex<Outcome>,
}

impl ResultSlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Outcome::Empty),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Outcome> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn replace(&self, next: Outcome) {
        let previous = mem::replace(&mut *self.lock(), next);
        drop(previous);
    }

    /// Release any buffer and clear the error fields. Idempotent.
    pub fn reset(&self) {
        self.replace(Outcome::Empty);
    }

    /// Publish a successful result.
    ///
    /// An empty buffer is never published; it is recorded as
    /// [`ErrorKind::EmptyOutput`] instead.
    pub fn publish_success(&self, data: Vec<u8>) {
        if data.is_empty() {
            self.record_failure(ErrorKind::EmptyOutput, "decompressed output is empty");
            return;
        }
        debug!(size = data.len(), "result published");
        self.replace(Outcome::Success(data));
    }

    /// Record a failure, dropping any previously held buffer.
    pub fn record_failure(&self, kind: ErrorKind, message: &str) {
        warn!(code = kind.code(), kind = %kind, "{message}");
        self.replace(Outcome::Failure {
            kind,
            message: BoundedMessage::new(message),
        });
    }

    /// Publish the outcome of an engine call.
    ///
    /// Returns the published size on success, or the error kind.
    ///
    /// # Errors
    ///
    /// Returns the [`ErrorKind`] of `result` when it is an error; the
    /// error has already been recorded in the slot.
    pub fn publish<E>(&self, result: Result<Decompressed, E>) -> Result<usize, ErrorKind>
    where
        E: Classify + Display,
    {
        match result {
            Ok(out) => {
                let size = out.len();
                self.publish_success(out.into_vec());
                Ok(size)
            }
            Err(e) => {
                let kind = e.kind();
                self.record_failure(kind, &e.to_string());
                Err(kind)
            }
        }
    }

    /// Size of the held buffer, `0` when empty or failed.
    #[must_use]
    pub fn size(&self) -> usize {
        match &*self.lock() {
            Outcome::Success(data) => data.len(),
            _ => 0,
        }
    }

    /// Error code of the last failure, `0` otherwise.
    #[must_use]
    pub fn error_code(&self) -> i32 {
        self.error_kind().map_or(0, ErrorKind::code)
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &*self.lock() {
            Outcome::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Error message of the last failure, empty otherwise.
    #[must_use]
    pub fn error_message(&self) -> String {
        match &*self.lock() {
            Outcome::Failure { message, .. } => message.as_str().to_owned(),
            _ => String::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&*self.lock(), Outcome::Empty)
    }

    /// Run `f` against the held buffer while the slot is locked.
    pub fn with_data<R>(&self, f: impl FnOnce(Option<&[u8]>) -> R) -> R {
        match &*self.lock() {
            Outcome::Success(data) => f(Some(data)),
            _ => f(None),
        }
    }

    /// Copy of the held buffer, if any.
    #[must_use]
    pub fn data(&self) -> Option<Vec<u8>> {
        self.with_data(|data| data.map(<[u8]>::to_vec))
    }

    /// Pointer and length of the held buffer for C callers.
    ///
    /// Returns a null pointer and `0` when nothing is held. The pointer
    /// stays valid until the next `reset`, publish, or failure on this
    /// slot; callers across an FFI boundary must not hold it past that.
    #[must_use]
    pub fn raw_data(&self) -> (*const u8, usize) {
        match &*self.lock() {
            Outcome::Success(data) => (data.as_ptr(), data.len()),
            _ => (std::ptr::null(), 0),
        }
    }

    /// NUL-terminated error message for C callers, empty on success.
    ///
    /// The pointer stays valid while the slot itself is alive and
    /// unmodified, under the same rule as [`raw_data`](Self::raw_data).
    #[must_use]
    pub fn raw_error_message(&self) -> *const c_char {
        const EMPTY: &CStr = c"";
        match &*self.lock() {
            Outcome::Failure { message, .. } => message.as_c_str().as_ptr(),
            _ => EMPTY.as_ptr(),
        }
    }
}
