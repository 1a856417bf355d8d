//! Byte compression behind the float series codec

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// A reversible byte transform
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>>;
    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>>;
}

/// zlib stream (RFC 1950)
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: Compression,
}

impl ZlibCompressor {
    /// `level` 0..=9, clamped
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl Compressor for ZlibCompressor {
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), self.level);
        encoder.write_all(data)?;
        encoder.finish()
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        let mut out = Vec::with_capacity(data.len() * 2);
        ZlibDecoder::new(data).read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Pass-through, for inspecting raw series bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl Compressor for NoCompression {
    fn compress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> io::Result<Vec<u8>> {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zlib_roundtrip() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 7) as u8).collect();
        let zlib = ZlibCompressor::default();
        let packed = zlib.compress(&data).unwrap();
        assert!(packed.len() < data.len());
        // zlib header, deflate method
        assert_eq!(packed[0] & 0x0f, 8);
        assert_eq!(zlib.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_zlib_rejects_garbage() {
        assert!(ZlibCompressor::default().decompress(b"definitely not zlib").is_err());
    }

    #[test]
    fn test_level_clamped() {
        let fast = ZlibCompressor::with_level(42);
        let packed = fast.compress(b"abcabcabc").unwrap();
        assert_eq!(fast.decompress(&packed).unwrap(), b"abcabcabc");
    }
}
