/// brotload command-line tool: fetch or read a compressed payload and
/// decompress it under the engine's memory limits.
///
/// # Command overview
///
/// ```text
/// brl <COMMAND> [OPTIONS]
///
/// Commands:
///   fetch        Download (or read) a locator and decompress it
///   decompress   Decompress a local file with the engine directly
///   limits       Print the effective limits
///   help         Print help information
///
/// Global options:
///   -v, --verbose          Log engine and transfer details to stderr
///   --max-output <BYTES>   Output ceiling            (default 200 MiB)
///   --max-input <BYTES>    Compressed input ceiling  (default 50 MiB)
///   --ratio <N>            Initial sizing multiple   (default 10)
///   --timeout <SECS>       HTTP request timeout      (default 60)
///   --codec <NAME>         brotli | zstd             (default brotli)
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                            |
/// |------|----------------------------------------------------|
/// | 0    | Success                                            |
/// | 1    | Error (download, limit, corrupt stream, I/O, etc.) |
///
/// Reports go to stdout; logs and errors go to stderr.
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::Result;
use brl_codec::CodecKind;
use brl_transfer::TransferConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_decompress;
mod cmd_fetch;
mod cmd_limits;
mod report;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Bounded-memory Brotli download and decompression.
#[derive(Parser)]
#[command(name = "brl", version, about = "brotload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug details to stderr (`RUST_LOG` takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    limits: LimitArgs,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Download a locator (http, https, file or a path) and decompress it.
    Fetch(FetchArgs),
    /// Decompress a local file without the transfer layer.
    Decompress(DecompressArgs),
    /// Print the effective limits and transfer settings.
    Limits,
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Overrides applied on top of the default limits.
///
/// ```text
/// ┌──────────────┬──────────────────────────────────────────────┐
/// │ Flag         │ Field                                        │
/// ├──────────────┼──────────────────────────────────────────────┤
/// │ --max-output │ Limits::max_output                           │
/// │ --max-input  │ Limits::max_input                            │
/// │ --ratio      │ Limits::max_ratio                            │
/// │ --timeout    │ TransferConfig::timeout (seconds)            │
/// │ --codec      │ TransferConfig::codec                        │
/// └──────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct LimitArgs {
    /// Largest decompressed output, in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_output: Option<usize>,

    /// Largest compressed input, in bytes.
    #[arg(long, global = true, value_name = "BYTES")]
    pub max_input: Option<usize>,

    /// Initial output buffer as a multiple of the input size.
    #[arg(long, global = true, value_name = "N")]
    pub ratio: Option<usize>,

    /// HTTP request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Compression format of the payload.
    #[arg(long, global = true, default_value_t = CodecKind::Brotli)]
    pub codec: CodecKind,
}

impl LimitArgs {
    /// Build the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an override makes the limits unusable.
    pub fn to_config(&self) -> Result<TransferConfig> {
        let mut config = TransferConfig {
            codec: self.codec,
            ..TransferConfig::default()
        };
        if let Some(max_output) = self.max_output {
            config.limits.max_output = max_output;
        }
        if let Some(max_input) = self.max_input {
            config.limits.max_input = max_input;
        }
        if let Some(ratio) = self.ratio {
            config.limits.max_ratio = ratio;
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for `brl fetch`.
#[derive(clap::Args)]
pub struct FetchArgs {
    /// `http://`, `https://` or `file://` locator, or a plain path.
    pub locator: String,

    /// Write the decompressed bytes to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `brl decompress`.
#[derive(clap::Args)]
pub struct DecompressArgs {
    /// Compressed input file.
    pub file: PathBuf,

    /// Write the decompressed bytes to this file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = cli.limits.to_config().and_then(|config| match &cli.command {
        Commands::Fetch(args) => cmd_fetch::run(args, &config),
        Commands::Decompress(args) => cmd_decompress::run(args, &config),
        Commands::Limits => {
            cmd_limits::run(&config);
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
