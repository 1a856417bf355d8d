//! Base-128 varints
//!
//! Little-endian 7-bit groups, continuation bit 0x80 on every byte but the
//! last, at most 10 bytes per u64. Signed values are zigzag mapped first.

use super::CodecError;
use bytes::BufMut;

/// Longest encoding of a u64
pub const MAX_VARINT_LEN: usize = 10;

#[inline]
pub fn put_uvarint<B: BufMut>(out: &mut B, mut value: u64) {
    while value >= 0x80 {
        out.put_u8(value as u8 | 0x80);
        value >>= 7;
    }
    out.put_u8(value as u8);
}

#[inline]
pub fn put_varint<B: BufMut>(out: &mut B, value: i64) {
    put_uvarint(out, zigzag_encode(value));
}

/// Decode one unsigned varint from the front of `buf`
///
/// Returns the value and the number of bytes consumed.
#[inline]
pub fn read_uvarint(buf: &[u8]) -> Result<(u64, usize), CodecError> {
    let mut value = 0u64;
    let mut shift = 0u32;
    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(CodecError::MalformedFrame("varint longer than 10 bytes"));
        }
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(CodecError::MalformedFrame("varint overflows u64"));
            }
            return Ok((value | (byte as u64) << shift, i + 1));
        }
        value |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }
    Err(CodecError::MalformedFrame("truncated varint"))
}

#[inline]
pub fn read_varint(buf: &[u8]) -> Result<(i64, usize), CodecError> {
    read_uvarint(buf).map(|(value, n)| (zigzag_decode(value), n))
}

/// 0, -1, 1, -2, 2 ... → 0, 1, 2, 3, 4 ...
#[inline(always)]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline(always)]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Encoded length of `value` in bytes
#[inline]
pub const fn uvarint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        put_uvarint(&mut out, value);
        out
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(1), [0x01]);
        assert_eq!(encode(127), [0x7f]);
        assert_eq!(encode(128), [0x80, 0x01]);
        assert_eq!(encode(300), [0xac, 0x02]);
        assert_eq!(encode(12345), [0xb9, 0x60]);
        assert_eq!(encode(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn test_read_back() {
        for value in [0, 1, 127, 128, 300, 1 << 35, u64::MAX] {
            let bytes = encode(value);
            assert_eq!(read_uvarint(&bytes).unwrap(), (value, bytes.len()));
            assert_eq!(uvarint_len(value), bytes.len());
        }
    }

    #[test]
    fn test_reads_only_first_varint() {
        assert_eq!(read_uvarint(&[0xac, 0x02, 0x05]).unwrap(), (300, 2));
    }

    #[test]
    fn test_truncated() {
        assert!(matches!(read_uvarint(&[]), Err(CodecError::MalformedFrame(_))));
        assert!(matches!(read_uvarint(&[0x80, 0x80]), Err(CodecError::MalformedFrame(_))));
    }

    #[test]
    fn test_overflow() {
        let mut too_long = vec![0xff; 10];
        too_long.push(0x01);
        assert!(read_uvarint(&too_long).is_err());

        let mut tenth_too_big = vec![0xff; 9];
        tenth_too_big.push(0x02);
        assert!(read_uvarint(&tenth_too_big).is_err());
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
        for v in [0, -1, 1, -64, 64, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(v)), v);
        }
    }

    #[test]
    fn test_signed_varint() {
        let mut out = Vec::new();
        put_varint(&mut out, -3);
        assert_eq!(out, [0x05]);
        assert_eq!(read_varint(&out).unwrap(), (-3, 1));
    }
}
