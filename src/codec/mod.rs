//! Binary codecs for price updates
//!
//! - varint: base-128 and zigzag primitives
//! - delta: per-cycle frame of changed markets (skip, bid, ask - bid)
//! - series: compressed delta encoding of a float series
//! - compressor: pluggable byte compression for the series codec

pub mod compressor;
pub mod delta;
pub mod series;
pub mod varint;

pub use compressor::{Compressor, NoCompression, ZlibCompressor};
pub use delta::{DecodedPrice, DeltaCodec, DeltaEntry, DeltaFrame};
pub use series::FloatSeriesCodec;

use thiserror::Error;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed frame: {0}")]
    MalformedFrame(&'static str),

    #[error("Malformed frame: compressed payload is corrupt: {0}")]
    Corrupt(#[source] std::io::Error),

    #[error("Cannot encode an empty series")]
    EmptyInput,

    #[error("Precision must be a positive integer")]
    InvalidPrecision,

    #[error("Compression failed: {0}")]
    Compression(#[source] std::io::Error),
}

impl CodecError {
    /// Input bytes could not be decoded
    pub fn is_malformed(&self) -> bool {
        matches!(self, CodecError::MalformedFrame(_) | CodecError::Corrupt(_))
    }
}
