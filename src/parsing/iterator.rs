//! Streaming token scanner over a fixed reload window
//!
//! The iterator never buffers the whole input. It reads the source into a
//! fixed-capacity window and scans tokens in place. A token that runs past
//! the end of the window has its prefix copied into the spill buffer before
//! the window is reloaded; the returned token is then spill + continuation.
//!
//! Tokens that straddle a reload and exceed the spill capacity are
//! truncated to that capacity. This is a documented bound, not an error;
//! `last_token_truncated()` reports it.
//!
//! The first read error is recorded and ends the stream. No retries beyond
//! `ErrorKind::Interrupted`.

use super::StreamLimits;
use std::io::{self, Read};

const fn byte_table(bytes: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < bytes.len() {
        table[bytes[i] as usize] = true;
        i += 1;
    }
    table
}

/// Bytes skipped between tokens. ':' is included so a value read right
/// after its key starts at the first value byte.
static SKIP: [bool; 256] = byte_table(b" \t\r\n:");

/// Bytes terminating a bare value
static VALUE_END: [bool; 256] = byte_table(b" \t\r\n,}]");

/// Scanner state for a single value token
#[derive(Clone, Copy)]
enum ValueState {
    Bare,
    Open,
    InString,
    Escape,
}

impl ValueState {
    /// Returns true when `c` terminates the value
    #[inline(always)]
    fn step(&mut self, c: u8) -> bool {
        match *self {
            Self::Bare => VALUE_END[c as usize],
            Self::Open => {
                *self = Self::InString;
                false
            }
            Self::InString => {
                match c {
                    b'\\' => *self = Self::Escape,
                    b'"' => *self = Self::Bare,
                    _ => {}
                }
                false
            }
            Self::Escape => {
                *self = Self::InString;
                false
            }
        }
    }
}

/// Cursor-based JSON token scanner
///
/// Not shareable between threads while scanning: cursors and the spill
/// buffer are mutated in place. Run one iterator per stream.
pub struct ByteStreamIterator<R> {
    source: R,
    window: Box<[u8]>,
    head: usize,
    tail: usize,
    spill: Box<[u8]>,
    spill_len: usize,
    truncated: bool,
    exhausted: bool,
    error: Option<io::Error>,
    reloads: u64,
}

impl<R: Read> ByteStreamIterator<R> {
    /// Iterator with default window and spill capacities
    pub fn new(source: R) -> Self {
        Self::with_limits(source, &StreamLimits::default())
    }

    pub fn with_limits(source: R, limits: &StreamLimits) -> Self {
        Self {
            source,
            window: vec![0u8; limits.window_capacity.max(1)].into_boxed_slice(),
            head: 0,
            tail: 0,
            spill: vec![0u8; limits.spill_capacity].into_boxed_slice(),
            spill_len: 0,
            truncated: false,
            exhausted: false,
            error: None,
            reloads: 0,
        }
    }

    /// Advance past the next `{` or `[`, consuming it
    ///
    /// Returns false when the source ends before a container is found.
    pub fn start_container(&mut self) -> bool {
        while let Some(c) = self.current() {
            self.head += 1;
            if c == b'{' || c == b'[' {
                return true;
            }
        }
        false
    }

    /// Advance past the next `,`, `}` or `]` and return it
    ///
    /// None at end of stream.
    pub fn next_boundary(&mut self) -> Option<u8> {
        while let Some(c) = self.current() {
            self.head += 1;
            if matches!(c, b',' | b'}' | b']') {
                return Some(c);
            }
        }
        None
    }

    /// Advance past the closing `}`/`]` of the container the cursor is in
    ///
    /// Nested containers and quoted strings are skipped as a whole.
    pub fn end_container(&mut self) -> bool {
        let mut depth = 1usize;
        let mut in_string = false;
        let mut escaped = false;

        while let Some(c) = self.current() {
            self.head += 1;
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == b'\\' {
                    escaped = true;
                } else if c == b'"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    /// Raw key bytes up to (not including) the `:` separator, quotes included
    ///
    /// None at end of stream.
    pub fn read_key(&mut self) -> Option<&[u8]> {
        self.peek()?;
        self.scan_token(|c| c == b':')
    }

    /// Raw value bytes up to the next `,`, `}`, `]` or whitespace
    ///
    /// Quoted values are scanned to their closing quote first, so
    /// delimiters inside strings do not end the token. None when the
    /// stream ends before the value is terminated.
    pub fn read_value(&mut self) -> Option<&[u8]> {
        let first = self.peek()?;
        let mut state = if first == b'"' {
            ValueState::Open
        } else {
            ValueState::Bare
        };
        self.scan_token(move |c| state.step(c))
    }

    /// Skip one value, including nested containers
    pub fn skip_value(&mut self) -> bool {
        match self.peek() {
            Some(b'{') | Some(b'[') => {
                self.head += 1;
                self.end_container()
            }
            Some(_) => self.read_value().is_some(),
            None => false,
        }
    }

    /// Skip whitespace and return the next significant byte without consuming it
    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        loop {
            let c = self.current()?;
            if !SKIP[c as usize] {
                return Some(c);
            }
            self.head += 1;
        }
    }

    /// Consume the byte returned by `peek`
    #[inline]
    pub fn bump(&mut self) {
        if self.head < self.tail {
            self.head += 1;
        }
    }

    /// True if the last key/value token was cut at the spill capacity
    #[inline]
    pub fn last_token_truncated(&self) -> bool {
        self.truncated
    }

    /// First error reported by the source, if any
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// True once the source reported end of stream or failed
    pub fn is_exhausted(&self) -> bool {
        self.exhausted && self.head >= self.tail
    }

    /// Number of window loads so far
    pub fn reloads(&self) -> u64 {
        self.reloads
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    /// Byte at the cursor, reloading the window when it is used up
    #[inline(always)]
    fn current(&mut self) -> Option<u8> {
        if self.head >= self.tail && !self.load_more() {
            return None;
        }
        Some(self.window[self.head])
    }

    /// Scan from the cursor until `is_end` accepts a byte (left unconsumed)
    fn scan_token(&mut self, mut is_end: impl FnMut(u8) -> bool) -> Option<&[u8]> {
        self.spill_len = 0;
        self.truncated = false;
        let mut start = self.head;

        loop {
            while self.head < self.tail {
                if is_end(self.window[self.head]) {
                    return Some(self.finish_token(start));
                }
                self.head += 1;
            }
            // Window exhausted mid-token: keep the prefix before reloading
            self.stash(start, self.tail);
            if !self.load_more() {
                return None;
            }
            start = 0;
        }
    }

    /// Append window[from..to] to the spill buffer, truncating at capacity
    #[inline]
    fn stash(&mut self, from: usize, to: usize) {
        let len = to - from;
        let take = len.min(self.spill.len() - self.spill_len);
        self.spill[self.spill_len..self.spill_len + take]
            .copy_from_slice(&self.window[from..from + take]);
        self.spill_len += take;
        if take < len {
            self.truncated = true;
        }
    }

    #[inline]
    fn finish_token(&mut self, start: usize) -> &[u8] {
        if self.spill_len == 0 && !self.truncated {
            return &self.window[start..self.head];
        }
        self.stash(start, self.head);
        &self.spill[..self.spill_len]
    }

    fn load_more(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        loop {
            match self.source.read(&mut self.window) {
                Ok(0) => {
                    self.exhausted = true;
                    return false;
                }
                Ok(n) => {
                    self.head = 0;
                    self.tail = n;
                    self.reloads += 1;
                    return true;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.error.is_none() {
                        self.error = Some(e);
                    }
                    self.exhausted = true;
                    return false;
                }
            }
        }
    }
}
