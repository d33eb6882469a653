/// The summary printed after a successful run, as text or JSON.
///
/// ```text
/// Source:        https://example.com/data.br
/// Codec:         brotli
/// Compressed:    1204 bytes
/// Decompressed:  48000 bytes  (39.87x)
/// Download:      12.41 ms
/// Decompress:    0.87 ms
/// BLAKE3:        9f1c…
/// Written to:    out.bin
/// ```
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub source: &'a str,
    pub codec: &'static str,
    /// Unknown for `fetch`; the orchestrator only reports the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compressed_bytes: Option<usize>,
    pub decompressed_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_ms: Option<f64>,
    pub decompress_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_steps: Option<u32>,
    pub blake3: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a Path>,
}

/// Hex BLAKE3 digest of `data`.
pub fn digest(data: &[u8]) -> String {
    hex::encode(blake3::hash(data).as_bytes())
}

impl Report<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn ratio(&self) -> Option<f64> {
        self.compressed_bytes
            .filter(|&c| c > 0)
            .map(|c| self.decompressed_bytes as f64 / c as f64)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Source:        {}", self.source);
        let _ = writeln!(out, "Codec:         {}", self.codec);
        if let Some(compressed) = self.compressed_bytes {
            let _ = writeln!(out, "Compressed:    {compressed} bytes");
        }
        let _ = write!(out, "Decompressed:  {} bytes", self.decompressed_bytes);
        if let Some(ratio) = self.ratio() {
            let _ = write!(out, "  ({ratio:.2}x)");
        }
        out.push('\n');
        if let Some(ms) = self.download_ms {
            let _ = writeln!(out, "Download:      {ms:.2} ms");
        }
        let _ = writeln!(out, "Decompress:    {:.2} ms", self.decompress_ms);
        if let Some(steps) = self.growth_steps {
            let _ = writeln!(out, "Growth steps:  {steps}");
        }
        let _ = writeln!(out, "BLAKE3:        {}", self.blake3);
        if let Some(path) = self.output {
            let _ = writeln!(out, "Written to:    {}", path.display());
        }
        out
    }

    /// Print to stdout in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialisation fails.
    pub fn print(&self, json: bool) -> anyhow::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(self)?);
        } else {
            print!("{}", self.to_text());
        }
        Ok(())
    }
}
