//! Fixed-capacity string storage for decoded records
//!
//! Stores up to `N` bytes inline. Longer input is truncated, never rejected.
//! Truncation never splits a UTF-8 sequence.

use std::fmt;

/// Default capacity for decoded string fields
pub const DEFAULT_STR_CAPACITY: usize = 64;

/// Inline string with a fixed byte capacity
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlineStr<const N: usize = DEFAULT_STR_CAPACITY> {
    buf: [u8; N],
    len: u8,
}

impl<const N: usize> InlineStr<N> {
    /// Capacity in bytes (capped at 255 by the length field)
    pub const CAPACITY: usize = if N > u8::MAX as usize { u8::MAX as usize } else { N };

    /// Empty string
    #[inline(always)]
    pub const fn new() -> Self {
        Self { buf: [0; N], len: 0 }
    }

    /// Copy from bytes, truncating to capacity and to the last valid UTF-8 boundary
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut s = Self::new();
        s.set(bytes);
        s
    }

    /// Overwrite contents in place
    #[inline]
    pub fn set(&mut self, bytes: &[u8]) {
        let take = bytes.len().min(Self::CAPACITY);
        let valid = match std::str::from_utf8(&bytes[..take]) {
            Ok(_) => take,
            Err(e) => e.valid_up_to(),
        };
        self.buf[..valid].copy_from_slice(&bytes[..valid]);
        self.len = valid as u8;
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        // set() only stores a valid UTF-8 prefix
        std::str::from_utf8(self.as_bytes()).unwrap_or("")
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for InlineStr<N> {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for InlineStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for InlineStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> PartialEq<str> for InlineStr<N> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> PartialEq<&str> for InlineStr<N> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}
