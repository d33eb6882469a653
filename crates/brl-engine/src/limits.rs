/// Initial output sizing multiple relative to the compressed input.
pub const MAX_RATIO: usize = 10;

/// Preallocation used by transfer buffers when the payload size is not
/// announced up front.
pub const INITIAL_BUFFER_SIZE: usize = 1024 * 1024;

/// Absolute ceiling on the decompression output buffer (200 MiB).
pub const MAX_BUFFER_SIZE: usize = 200 * 1024 * 1024;

/// Largest compressed payload the engine accepts (50 MiB).
pub const MAX_COMPRESSED_INPUT: usize = 50 * 1024 * 1024;

/// Memory limits enforced by the decompression engine.
///
/// The defaults are the module constants above. Hosts and tests may
/// tighten them; [`Limits::validate`] rejects values that would make
/// the growth loop degenerate.
///
/// ```text
/// ┌─────────────────────┬──────────┬─────────────────────────────────────┐
/// │ Field               │ Default  │ Enforced where                      │
/// ├─────────────────────┼──────────┼─────────────────────────────────────┤
/// │ max_ratio           │ 10       │ initial output capacity             │
/// │ initial_buffer_size │ 1 MiB    │ transfer body preallocation         │
/// │ max_output          │ 200 MiB  │ arena allocation and every growth   │
/// │ max_input           │ 50 MiB   │ before decoding; during download    │
/// └─────────────────────┴──────────┴─────────────────────────────────────┘
/// ```
///
/// With the defaults a 50 MiB input would ask for 500 MiB up front; the
/// output ceiling wins and the arena starts at 200 MiB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_ratio: usize,
    pub initial_buffer_size: usize,
    pub max_output: usize,
    pub max_input: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_ratio: MAX_RATIO,
            initial_buffer_size: INITIAL_BUFFER_SIZE,
            max_output: MAX_BUFFER_SIZE,
            max_input: MAX_COMPRESSED_INPUT,
        }
    }
}

/// A [`Limits`] field holds a value the engine cannot work with.
#[derive(Debug, thiserror::Error)]
#[error("invalid limit {field}: {reason}")]
pub struct LimitsError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl Limits {
    /// Check that every limit is usable.
    ///
    /// # Errors
    ///
    /// Returns [`LimitsError`] naming the first zero-valued field.
    pub fn validate(&self) -> Result<(), LimitsError> {
        let fields = [
            ("max_ratio", self.max_ratio),
            ("initial_buffer_size", self.initial_buffer_size),
            ("max_output", self.max_output),
            ("max_input", self.max_input),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(LimitsError {
                    field,
                    reason: "must be at least 1",
                });
            }
        }
        Ok(())
    }

    /// Output capacity to allocate for `input_len` compressed bytes:
    /// `min(input_len × max_ratio, max_output)`, never below one byte.
    #[must_use]
    pub fn initial_capacity(&self, input_len: usize) -> usize {
        input_len
            .saturating_mul(self.max_ratio)
            .min(self.max_output)
            .max(1)
    }

    /// Preallocation for a transfer body of `announced` bytes (if known).
    #[must_use]
    pub fn transfer_capacity(&self, announced: Option<u64>) -> usize {
        announced
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(self.initial_buffer_size)
            .min(self.max_input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let limits = Limits::default();
        assert_eq!(limits.max_ratio, 10);
        assert_eq!(limits.initial_buffer_size, 1 << 20);
        assert_eq!(limits.max_output, 200 << 20);
        assert_eq!(limits.max_input, 50 << 20);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn initial_capacity_scales_with_ratio() {
        let limits = Limits::default();
        assert_eq!(limits.initial_capacity(1), 10);
        assert_eq!(limits.initial_capacity(4096), 40_960);
    }

    #[test]
    fn initial_capacity_is_clamped_to_ceiling() {
        let limits = Limits::default();
        assert_eq!(limits.initial_capacity(MAX_COMPRESSED_INPUT), MAX_BUFFER_SIZE);
        assert_eq!(limits.initial_capacity(usize::MAX), MAX_BUFFER_SIZE);
    }

    #[test]
    fn transfer_capacity_prefers_announced_size() {
        let limits = Limits::default();
        assert_eq!(limits.transfer_capacity(Some(1234)), 1234);
        assert_eq!(limits.transfer_capacity(None), INITIAL_BUFFER_SIZE);
        assert_eq!(limits.transfer_capacity(Some(u64::MAX)), MAX_COMPRESSED_INPUT);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let limits = Limits {
            max_output: 0,
            ..Limits::default()
        };
        let err = limits.validate().unwrap_err();
        assert_eq!(err.field, "max_output");
    }
}
