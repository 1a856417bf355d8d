//! Float series codec
//!
//! Layout before compression:
//!
//! ```text
//! u64 BE   precision
//! u64 BE   first sample, fixed point (two's complement)
//! varint*  zigzag deltas between consecutive fixed-point samples
//! ```

use super::compressor::{Compressor, ZlibCompressor};
use super::varint::{put_varint, read_varint, MAX_VARINT_LEN};
use super::CodecError;
use crate::core::Precision;
use bytes::{Buf, BufMut};

/// Bytes before the first delta
pub const HEADER_LEN: usize = 16;

/// Fixed-point delta codec for an ordered f64 sequence
#[derive(Debug, Clone, Default)]
pub struct FloatSeriesCodec<C = ZlibCompressor> {
    compressor: C,
}

impl FloatSeriesCodec<ZlibCompressor> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Compressor> FloatSeriesCodec<C> {
    pub fn with_compressor(compressor: C) -> Self {
        Self { compressor }
    }

    /// Delta-encode `samples` then compress
    ///
    /// # Errors
    /// `EmptyInput` for an empty slice, `Compression` if the compressor fails.
    pub fn encode(&self, samples: &[f64], precision: Precision) -> Result<Vec<u8>, CodecError> {
        let raw = encode_raw(samples, precision)?;
        self.compressor.compress(&raw).map_err(CodecError::Compression)
    }

    /// Decompress then rebuild the samples
    ///
    /// Precision comes from the header.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<f64>, CodecError> {
        let raw = self.compressor.decompress(bytes).map_err(CodecError::Corrupt)?;
        decode_raw(&raw)
    }
}

/// Uncompressed encoding
pub fn encode_raw(samples: &[f64], precision: Precision) -> Result<Vec<u8>, CodecError> {
    let (first, rest) = samples.split_first().ok_or(CodecError::EmptyInput)?;

    let mut out = Vec::with_capacity(HEADER_LEN + rest.len() * 2);
    let mut prev = precision.to_fixed_signed(*first);
    out.put_u64(precision.get());
    out.put_i64(prev);

    for &sample in rest {
        let fixed = precision.to_fixed_signed(sample);
        put_varint(&mut out, fixed.wrapping_sub(prev));
        prev = fixed;
    }
    Ok(out)
}

/// Decode the uncompressed layout
pub fn decode_raw(raw: &[u8]) -> Result<Vec<f64>, CodecError> {
    if raw.len() < HEADER_LEN {
        return Err(CodecError::MalformedFrame("series header is incomplete"));
    }
    let (mut header, mut body) = raw.split_at(HEADER_LEN);
    let precision =
        Precision::new(header.get_u64()).ok_or(CodecError::MalformedFrame("series precision is zero"))?;
    let mut fixed = header.get_i64();

    let mut samples = Vec::with_capacity(1 + body.len() / 2);
    samples.push(precision.from_fixed_signed(fixed));
    while !body.is_empty() {
        let (delta, n) = read_varint(&body[..body.len().min(MAX_VARINT_LEN)])?;
        fixed = fixed.wrapping_add(delta);
        samples.push(precision.from_fixed_signed(fixed));
        body = &body[n..];
    }
    Ok(samples)
}
