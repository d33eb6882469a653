use std::ffi::CStr;
use std::fmt;

/// Longest error message kept, in bytes, excluding the terminator.
pub const MAX_MESSAGE_LEN: usize = 255;

/// A UTF-8 error message of at most [`MAX_MESSAGE_LEN`] bytes, stored
/// inline with a trailing NUL so it can be lent to C callers as-is.
///
/// Longer messages are cut at the last character boundary that fits.
/// An interior NUL ends the message early.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BoundedMessage {
    buf: [u8; MAX_MESSAGE_LEN + 1],
    len: usize,
}

impl BoundedMessage {
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            buf: [0; MAX_MESSAGE_LEN + 1],
            len: 0,
        }
    }

    #[must_use]
    pub fn new(message: &str) -> Self {
        let message = message.split('\0').next().unwrap_or_default();
        let mut len = message.len().min(MAX_MESSAGE_LEN);
        while !message.is_char_boundary(len) {
            len -= 1;
        }

        let mut out = Self::empty();
        out.buf[..len].copy_from_slice(&message.as_bytes()[..len]);
        out.len = len;
        out
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only whole characters are ever copied in.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    /// The message as a NUL-terminated C string.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        CStr::from_bytes_until_nul(&self.buf).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for BoundedMessage {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for BoundedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for BoundedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
