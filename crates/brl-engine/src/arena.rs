/// Errors from allocating or growing an [`OutputArena`].
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("failed to allocate {requested} bytes")]
    Allocation { requested: usize },

    #[error("growing {capacity} to {requested} bytes would pass the {ceiling}-byte ceiling")]
    CeilingExceeded {
        capacity: usize,
        requested: usize,
        ceiling: usize,
    },
}

/// The single growable output buffer of one decompression call.
///
/// The arena owns a zero-initialised region of `capacity` bytes, the
/// first `filled` of which hold decoded output. The write cursor is the
/// `filled` offset rather than a pointer, so growth may relocate the
/// backing allocation freely.
///
/// ```text
///   0            filled                 capacity        ceiling
///   ├──────────────┼───────────────────────┤ · · · · · · · ┤
///   │ decoded data │ space for the decoder │  never mapped │
/// ```
///
/// Invariant: `filled ≤ capacity ≤ ceiling`. Growth either doubles the
/// capacity with every decoded byte intact, or fails and leaves the
/// arena as it was; the engine then drops it without publishing.
#[derive(Debug)]
pub struct OutputArena {
    buf: Vec<u8>,
    filled: usize,
    ceiling: usize,
    growth_steps: u32,
}

impl OutputArena {
    /// Allocate an arena of `initial` bytes that may grow up to `ceiling`.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::CeilingExceeded`] if `initial > ceiling`.
    /// - [`ArenaError::Allocation`] if the allocator refuses the request.
    pub fn allocate(initial: usize, ceiling: usize) -> Result<Self, ArenaError> {
        if initial > ceiling {
            return Err(ArenaError::CeilingExceeded {
                capacity: 0,
                requested: initial,
                ceiling,
            });
        }

        let mut buf = Vec::new();
        buf.try_reserve_exact(initial)
            .map_err(|_| ArenaError::Allocation { requested: initial })?;
        buf.resize(initial, 0);

        Ok(Self {
            buf,
            filled: 0,
            ceiling,
            growth_steps: 0,
        })
    }

    /// Double the capacity, preserving all decoded bytes.
    ///
    /// Returns the new capacity.
    ///
    /// # Errors
    ///
    /// - [`ArenaError::CeilingExceeded`] if the doubled capacity passes the
    ///   ceiling (or overflows `usize`).
    /// - [`ArenaError::Allocation`] if the allocator refuses the request.
    ///
    /// On error the arena is unchanged.
    pub fn grow(&mut self) -> Result<usize, ArenaError> {
        let capacity = self.capacity();
        let ceiling = self.ceiling;
        let requested = capacity
            .checked_mul(2)
            .filter(|&n| n <= ceiling)
            .ok_or(ArenaError::CeilingExceeded {
                capacity,
                requested: capacity.saturating_mul(2),
                ceiling,
            })?;

        self.buf
            .try_reserve_exact(requested - capacity)
            .map_err(|_| ArenaError::Allocation { requested })?;
        self.buf.resize(requested, 0);
        self.growth_steps += 1;

        Ok(requested)
    }

    /// The whole buffer plus the write cursor, for handing to a codec.
    pub fn window(&mut self) -> (&mut [u8], &mut usize) {
        (self.buf.as_mut_slice(), &mut self.filled)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn filled(&self) -> usize {
        self.filled
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.capacity() - self.filled
    }

    #[must_use]
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    #[must_use]
    pub fn growth_steps(&self) -> u32 {
        self.growth_steps
    }

    /// The decoded prefix.
    #[must_use]
    pub fn filled_bytes(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Consume the arena, keeping only the decoded prefix.
    ///
    /// Unused capacity is released before the buffer is handed out.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.filled);
        self.buf.shrink_to_fit();
        self.buf
    }
}
