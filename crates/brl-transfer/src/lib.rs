#![warn(clippy::pedantic)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod orchestrator;
pub mod state;

pub use cancel::{CancelHandle, CancelSignal, cancel_pair};
pub use config::TransferConfig;
pub use error::TransferError;
pub use fetch::{Fetch, FileFetcher, HttpFetcher, LocatorFetcher};
pub use notify::{Completion, NoopNotifier, Notifier};
pub use orchestrator::Orchestrator;
pub use state::TransferState;
