//! Orchestrated transfers against a throwaway local HTTP server and
//! temporary files.
//!
//! The server answers exactly one request per spawn with a canned
//! status, optional `Content-Length`, and body, then closes the
//! connection.

use std::io::Write as _;
use std::sync::{Arc, Mutex};

use brl_engine::{ErrorKind, Limits, ResultSlot};
use brl_tests::{brotli, text, tight};
use brl_transfer::{
    CancelSignal, Completion, Fetch, HttpFetcher, LocatorFetcher, Orchestrator, TransferConfig,
    TransferError, TransferState, cancel_pair,
};
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Canned {
    status: u16,
    announce_length: bool,
    body: Vec<u8>,
}

/// Serve one response on an ephemeral port; returns the base URL.
async fn serve_once(canned: Canned) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let mut head = format!("HTTP/1.1 {} Canned\r\nConnection: close\r\n", canned.status);
        if canned.announce_length {
            head.push_str(&format!("Content-Length: {}\r\n", canned.body.len()));
        }
        head.push_str("\r\n");

        // The client may hang up early on purpose; write errors are fine.
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(&canned.body).await;
        let _ = socket.shutdown().await;
    });

    format!("http://{addr}")
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Completion>>);

impl brl_transfer::Notifier for Recorder {
    fn notify(&self, completion: &Completion) {
        self.0.lock().unwrap().push(*completion);
    }
}

fn orchestrator(limits: Limits) -> Orchestrator<LocatorFetcher, brl_codec::CodecKind> {
    let config = TransferConfig {
        limits,
        ..TransferConfig::default()
    };
    Orchestrator::from_config(&config, Arc::new(ResultSlot::new())).unwrap()
}

// ── HTTP ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn http_success_end_to_end() {
    let data = text(200_000);
    let url = serve_once(Canned {
        status: 200,
        announce_length: true,
        body: brotli(&data),
    })
    .await;

    let orch = orchestrator(Limits::default());
    let recorder = Recorder::default();
    let done = orch
        .run(&format!("{url}/payload.br"), &recorder, CancelSignal::never())
        .await;

    assert!(done.is_success(), "{}", orch.slot().error_message());
    assert_eq!(done.size, data.len());
    assert!(done.download_ms >= 0.0 && done.decompress_ms >= 0.0);
    assert_eq!(orch.state(), TransferState::Succeeded);
    assert_eq!(orch.slot().data().as_deref(), Some(&data[..]));
    assert_eq!(recorder.0.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn http_404_is_download_failed() {
    let url = serve_once(Canned {
        status: 404,
        announce_length: true,
        body: b"not found".to_vec(),
    })
    .await;

    let orch = orchestrator(Limits::default());
    let recorder = Recorder::default();
    let done = orch
        .run(&format!("{url}/missing.br"), &recorder, CancelSignal::never())
        .await;

    assert_eq!(done.error_kind(), Some(ErrorKind::DownloadFailed));
    assert_eq!(done.size, 0);
    assert_eq!(done.decompress_ms, 0.0);
    assert_eq!(orch.state(), TransferState::DownloadFailed);
    assert!(orch.slot().error_message().contains("404"));
    assert_eq!(recorder.0.lock().unwrap().as_slice(), &[done]);
}

#[tokio::test]
async fn announced_length_over_limit_is_refused_early() {
    let url = serve_once(Canned {
        status: 200,
        announce_length: true,
        body: vec![0; 4096],
    })
    .await;

    let fetcher = HttpFetcher::from_config(&TransferConfig::default()).unwrap();
    let err = fetcher.fetch(&url, &tight(1 << 20, 1024)).await.unwrap_err();
    assert!(
        matches!(err, TransferError::TooLarge { size: 4096, limit: 1024 }),
        "{err:?}"
    );
}

#[tokio::test]
async fn unannounced_body_is_cut_at_the_limit() {
    let url = serve_once(Canned {
        status: 200,
        announce_length: false,
        body: vec![7; 8192],
    })
    .await;

    let orch = orchestrator(tight(1 << 20, 1024));
    let done = orch
        .run(&url, &brl_transfer::NoopNotifier, CancelSignal::never())
        .await;
    assert_eq!(done.error_kind(), Some(ErrorKind::InputTooLarge));
    assert_eq!(orch.state(), TransferState::DownloadFailed);
}

#[tokio::test]
async fn corrupt_download_fails_in_decompression() {
    let url = serve_once(Canned {
        status: 200,
        announce_length: true,
        body: vec![0x1C, 0x00, 0x00, 0x00],
    })
    .await;

    let orch = orchestrator(Limits::default());
    let done = orch
        .run(&url, &brl_transfer::NoopNotifier, CancelSignal::never())
        .await;
    assert_eq!(done.error_kind(), Some(ErrorKind::DecompressionFailed));
    assert_eq!(orch.state(), TransferState::Failed);
}

#[tokio::test]
async fn connection_refused_is_download_failed() {
    // Bind then drop to get a port nobody listens on.
    let addr = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();

    let orch = orchestrator(Limits::default());
    let done = orch
        .run(&format!("http://{addr}/x.br"), &brl_transfer::NoopNotifier, CancelSignal::never())
        .await;
    assert_eq!(done.error_kind(), Some(ErrorKind::DownloadFailed));
}

// ── Files ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_locator_end_to_end() {
    let data = text(12_345);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&brotli(&data)).unwrap();

    let orch = orchestrator(Limits::default());
    let done = orch
        .run(
            &format!("file://{}", file.path().display()),
            &brl_transfer::NoopNotifier,
            CancelSignal::never(),
        )
        .await;
    assert!(done.is_success());
    assert_eq!(orch.slot().data().as_deref(), Some(&data[..]));
}

#[tokio::test]
async fn empty_file_is_invalid_input() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let orch = orchestrator(Limits::default());
    let done = orch
        .run(
            file.path().to_str().unwrap(),
            &brl_transfer::NoopNotifier,
            CancelSignal::never(),
        )
        .await;
    assert_eq!(done.error_kind(), Some(ErrorKind::InvalidInput));
    assert_eq!(orch.state(), TransferState::DownloadFailed);
}

// ── Cancellation ──────────────────────────────────────────────────────────────

/// Blocks until the test lets it go.
struct Gate(tokio::sync::Notify);

impl Fetch for Gate {
    async fn fetch(&self, _: &str, _: &Limits) -> Result<Bytes, TransferError> {
        self.0.notified().await;
        Ok(Bytes::from(brotli(b"released")))
    }
}

#[tokio::test]
async fn cancelled_before_download_finishes() {
    let orch = Arc::new(Orchestrator::new(
        Gate(tokio::sync::Notify::new()),
        brl_engine::Decompressor::new(),
        Arc::new(ResultSlot::new()),
    ));
    let (handle, signal) = cancel_pair();

    let run = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move {
            orch.run("gate://", &brl_transfer::NoopNotifier, signal)
                .await
        })
    };
    handle.cancel();
    let done = run.await.unwrap();

    assert_eq!(done.error_kind(), Some(ErrorKind::DownloadFailed));
    assert_eq!(orch.slot().error_message(), "transfer cancelled");
    assert_eq!(orch.state(), TransferState::DownloadFailed);
}

#[tokio::test]
async fn cancel_after_completion_changes_nothing() {
    let gate = Gate(tokio::sync::Notify::new());
    gate.0.notify_one();
    let orch = Orchestrator::new(gate, brl_engine::Decompressor::new(), Arc::new(ResultSlot::new()));
    let (handle, signal) = cancel_pair();

    let done = orch.run("gate://", &brl_transfer::NoopNotifier, signal).await;
    handle.cancel();

    assert!(done.is_success());
    assert_eq!(orch.slot().data().as_deref(), Some(&b"released"[..]));
}
