use brl_engine::ErrorKind;

/// The single notification emitted when an operation reaches a terminal
/// state.
///
/// `size` is `0` on failure and `error_code` is `0` on success. Durations
/// are wall-clock milliseconds; a phase that never ran reports `0.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    pub download_ms: f64,
    pub decompress_ms: f64,
    pub size: usize,
    pub error_code: i32,
}

impl Completion {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }

    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        ErrorKind::from_code(self.error_code)
    }
}

/// Receives completion notifications from the orchestrator.
pub trait Notifier: Send + Sync {
    fn notify(&self, completion: &Completion);
}

impl<F> Notifier for F
where
    F: Fn(&Completion) + Send + Sync,
{
    fn notify(&self, completion: &Completion) {
        self(completion);
    }
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _: &Completion) {}
}
