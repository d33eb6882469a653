/// Implementation of `brl fetch`.
///
/// Runs one full orchestrated operation (download, decompress, publish)
/// on a private tokio runtime. Ctrl-C during the download cancels it.
use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use brl_codec::Codec;
use brl_engine::ResultSlot;
use brl_transfer::{Completion, Orchestrator, TransferConfig, cancel_pair};
use tokio::runtime;
use tracing::debug;

use crate::FetchArgs;
use crate::report::{Report, digest};

/// Run the `brl fetch` command.
///
/// # Errors
///
/// Returns an error if the runtime or HTTP client cannot be created, if
/// the operation fails at any stage, or if the output cannot be written.
pub fn run(args: &FetchArgs, config: &TransferConfig) -> Result<()> {
    let rt = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start tokio runtime")?;

    let slot = Arc::new(ResultSlot::new());
    let orchestrator = Orchestrator::from_config(config, Arc::clone(&slot))?;

    let completion = rt.block_on(async {
        let (handle, signal) = cancel_pair();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("interrupt received, cancelling");
                handle.cancel();
            }
        });
        let done = orchestrator
            .run(&args.locator, &|c: &Completion| debug!(?c, "completion"), signal)
            .await;
        interrupt.abort();
        done
    });

    if let Some(kind) = completion.error_kind() {
        bail!("{kind}: {}", slot.error_message());
    }

    slot.with_data(|data| {
        let data = data.ok_or_else(|| anyhow!("no result was published"))?;
        if let Some(path) = &args.output {
            fs::write(path, data).with_context(|| format!("cannot write {}", path.display()))?;
        }
        Report {
            source: &args.locator,
            codec: config.codec.name(),
            compressed_bytes: None,
            decompressed_bytes: data.len(),
            download_ms: Some(completion.download_ms),
            decompress_ms: completion.decompress_ms,
            growth_steps: None,
            blake3: digest(data),
            output: args.output.as_deref(),
        }
        .print(args.json)
    })
}
