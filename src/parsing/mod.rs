//! Streaming JSON decoding for flat ticker records
//!
//! Hot path decoding without intermediate JSON values:
//! - ByteStreamIterator: cursor-based token scanner over a reload window
//! - RecordDecoder: maps field names to typed setters, one object at a time
//! - number: best-effort float parsing

pub mod decoder;
pub mod iterator;
pub mod number;

pub use decoder::{FieldDesc, FieldKind, Record, RecordDecoder, Schema};
pub use iterator::ByteStreamIterator;
pub use number::parse_f64_best_effort;

use serde::{Deserialize, Serialize};

/// Fixed buffer sizes for one decoding pipeline
///
/// All three are hard limits: a straddling token longer than
/// `spill_capacity` and a string value longer than `string_capacity` are
/// truncated, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StreamLimits {
    /// Bytes read from the source per reload
    #[serde(default = "default_window_capacity")]
    pub window_capacity: usize,

    /// Bytes kept for a token split across reloads
    #[serde(default = "default_spill_capacity")]
    pub spill_capacity: usize,

    /// Bytes kept per decoded string field
    #[serde(default = "default_string_capacity")]
    pub string_capacity: usize,
}

impl Default for StreamLimits {
    fn default() -> Self {
        Self {
            window_capacity: default_window_capacity(),
            spill_capacity: default_spill_capacity(),
            string_capacity: default_string_capacity(),
        }
    }
}

fn default_window_capacity() -> usize {
    1500
}

fn default_spill_capacity() -> usize {
    128
}

fn default_string_capacity() -> usize {
    crate::core::DEFAULT_STR_CAPACITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = StreamLimits::default();
        assert_eq!(limits.window_capacity, 1500);
        assert_eq!(limits.spill_capacity, 128);
        assert_eq!(limits.string_capacity, 64);
    }

    #[test]
    fn test_partial_limits_from_toml() {
        let limits: StreamLimits = toml::from_str("window_capacity = 4096").unwrap();
        assert_eq!(limits.window_capacity, 4096);
        assert_eq!(limits.spill_capacity, 128);
    }
}
