/// Implementation of `brl limits`.
///
/// ```text
/// Limit                 Value
/// ─────────────────────────────────────────
/// max_ratio             10
/// initial_buffer_size   1048576  (1.0 MiB)
/// max_output            209715200  (200.0 MiB)
/// max_input             52428800  (50.0 MiB)
/// timeout               60 s
/// codec                 brotli
/// ```
use brl_transfer::TransferConfig;

#[allow(clippy::cast_precision_loss)]
fn mib(bytes: usize) -> String {
    format!("{bytes}  ({:.1} MiB)", bytes as f64 / (1024.0 * 1024.0))
}

pub fn render(config: &TransferConfig) -> String {
    let limits = &config.limits;
    let rows = [
        ("max_ratio", limits.max_ratio.to_string()),
        ("initial_buffer_size", mib(limits.initial_buffer_size)),
        ("max_output", mib(limits.max_output)),
        ("max_input", mib(limits.max_input)),
        ("timeout", format!("{} s", config.timeout.as_secs())),
        ("codec", config.codec.to_string()),
    ];

    let mut out = format!("{:<22}Value\n{}\n", "Limit", "─".repeat(41));
    for (name, value) in rows {
        out.push_str(&format!("{name:<22}{value}\n"));
    }
    out
}

/// Run the `brl limits` command.
pub fn run(config: &TransferConfig) {
    print!("{}", render(config));
}
