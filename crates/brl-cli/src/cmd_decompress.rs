/// Implementation of `brl decompress`.
///
/// Reads the whole file, runs the engine once, and reports sizes, timing
/// and the BLAKE3 digest of the output. The transfer layer is not
/// involved.
use std::fs;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use brl_codec::Codec;
use brl_engine::{Classify, Decompressor};
use brl_transfer::TransferConfig;

use crate::DecompressArgs;
use crate::report::{Report, digest};

/// Run the `brl decompress` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written, or if the
/// engine rejects the payload. Engine errors carry their taxonomy name.
pub fn run(args: &DecompressArgs, config: &TransferConfig) -> Result<()> {
    let compressed =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let engine = Decompressor::with_codec(config.codec).with_limits(config.limits)?;
    let started = Instant::now();
    let out = engine
        .decompress(&compressed)
        .map_err(|e| anyhow!("{}: {e}", e.kind()))
        .with_context(|| format!("failed to decompress {}", args.file.display()))?;
    let decompress_ms = started.elapsed().as_secs_f64() * 1000.0;

    if let Some(path) = &args.output {
        fs::write(path, out.as_slice())
            .with_context(|| format!("cannot write {}", path.display()))?;
    }

    let source = args.file.to_string_lossy();
    Report {
        source: &source,
        codec: engine.codec().name(),
        compressed_bytes: Some(out.compressed_len()),
        decompressed_bytes: out.len(),
        download_ms: None,
        decompress_ms,
        growth_steps: Some(out.growth_steps()),
        blake3: digest(out.as_slice()),
        output: args.output.as_deref(),
    }
    .print(args.json)
}
