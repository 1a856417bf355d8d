//! Fixed-point conversion for prices
//!
//! A `Precision` is the positive integer scale that turns a float price
//! into an integer: `fixed = trunc(price * precision)`.
//! Zero allocation, Copy type, no panics.

use crate::codec::CodecError;
use std::fmt;
use std::num::NonZeroU64;

/// Positive scale factor between float prices and fixed-point integers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Precision(NonZeroU64);

impl Precision {
    /// Scale of 1 (whole units)
    pub const ONE: Self = Self(NonZeroU64::MIN);

    /// Largest power of ten representable in u64
    pub const MAX_DECIMALS: u8 = 19;

    /// Create from a raw scale. Returns None for zero.
    #[inline]
    pub const fn new(scale: u64) -> Option<Self> {
        match NonZeroU64::new(scale) {
            Some(scale) => Some(Self(scale)),
            None => None,
        }
    }

    /// 10^decimals. Returns None if the power does not fit in u64.
    #[inline]
    pub fn from_decimals(decimals: u8) -> Option<Self> {
        10u64.checked_pow(decimals as u32).and_then(Self::new)
    }

    /// Derive precision from a tick size such as `0.01000000`
    ///
    /// Counts digits after the dot until the fraction is integral,
    /// the same way exchange price filters are usually interpreted.
    pub fn from_tick_size(tick: f64) -> Option<Self> {
        if !tick.is_finite() || tick <= 0.0 {
            return None;
        }
        let mut fraction = tick - tick.floor();
        let mut decimals = 0u8;
        while fraction != fraction.floor() {
            if decimals >= Self::MAX_DECIMALS {
                return None;
            }
            fraction *= 10.0;
            // Absorb binary representation noise (0.1 * 10 = 1.0000000000000002)
            let nearest = fraction.round();
            if nearest != 0.0 && (fraction - nearest).abs() < 1e-9 {
                fraction = nearest;
            }
            decimals += 1;
        }
        Self::from_decimals(decimals)
    }

    /// Raw scale value
    #[inline(always)]
    pub const fn get(&self) -> u64 {
        self.0.get()
    }

    /// Scale as f64 for float math
    #[inline(always)]
    pub fn as_f64(&self) -> f64 {
        self.0.get() as f64
    }

    /// Unsigned fixed-point value, truncated toward zero
    ///
    /// Negative and NaN inputs map to 0, values beyond u64 saturate.
    #[inline(always)]
    pub fn to_fixed(&self, value: f64) -> u64 {
        (value * self.as_f64()) as u64
    }

    /// Signed fixed-point value, truncated toward zero (saturating)
    #[inline(always)]
    pub fn to_fixed_signed(&self, value: f64) -> i64 {
        (value * self.as_f64()) as i64
    }

    /// Float value of an unsigned fixed-point integer
    #[inline(always)]
    pub fn from_fixed(&self, fixed: u64) -> f64 {
        fixed as f64 / self.as_f64()
    }

    /// Float value of a signed fixed-point integer
    #[inline(always)]
    pub fn from_fixed_signed(&self, fixed: i64) -> f64 {
        fixed as f64 / self.as_f64()
    }

    /// Largest error a fixed-point round trip can introduce
    #[inline]
    pub fn resolution(&self) -> f64 {
        1.0 / self.as_f64()
    }
}

impl Default for Precision {
    #[inline(always)]
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Precision {
    type Error = CodecError;

    fn try_from(scale: u64) -> Result<Self, Self::Error> {
        Self::new(scale).ok_or(CodecError::InvalidPrecision)
    }
}

impl serde::Serialize for Precision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.get())
    }
}

impl<'de> serde::Deserialize<'de> for Precision {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let scale = u64::deserialize(deserializer)?;
        Self::new(scale).ok_or_else(|| serde::de::Error::custom("precision must be positive"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rejected() {
        assert!(Precision::new(0).is_none());
        assert_eq!(Precision::new(100).unwrap().get(), 100);
    }

    #[test]
    fn test_try_from() {
        assert_eq!(Precision::try_from(1000).unwrap().get(), 1000);
        assert!(matches!(Precision::try_from(0), Err(CodecError::InvalidPrecision)));
    }

    #[test]
    fn test_from_decimals() {
        assert_eq!(Precision::from_decimals(0).unwrap().get(), 1);
        assert_eq!(Precision::from_decimals(2).unwrap().get(), 100);
        assert_eq!(Precision::from_decimals(8).unwrap().get(), 100_000_000);
        assert!(Precision::from_decimals(20).is_none());
    }

    #[test]
    fn test_from_tick_size() {
        assert_eq!(Precision::from_tick_size(0.01).unwrap().get(), 100);
        assert_eq!(Precision::from_tick_size(0.00000100).unwrap().get(), 1_000_000);
        assert_eq!(Precision::from_tick_size(0.1).unwrap().get(), 10);
        assert_eq!(Precision::from_tick_size(1.0).unwrap().get(), 1);
        assert!(Precision::from_tick_size(0.0).is_none());
        assert!(Precision::from_tick_size(f64::NAN).is_none());
    }

    #[test]
    fn test_to_fixed_truncates() {
        let p = Precision::new(100).unwrap();
        assert_eq!(p.to_fixed(123.45), 12345);
        assert_eq!(p.to_fixed(123.50), 12350);
        assert_eq!(p.to_fixed(0.019), 1);
        assert_eq!(p.to_fixed_signed(-0.019), -1);
    }

    #[test]
    fn test_negative_clamps_unsigned() {
        let p = Precision::new(100).unwrap();
        assert_eq!(p.to_fixed(-5.0), 0);
        assert_eq!(p.to_fixed(f64::NAN), 0);
    }

    #[test]
    fn test_from_fixed() {
        let p = Precision::new(100).unwrap();
        assert_eq!(p.from_fixed(12345), 123.45);
        assert_eq!(p.from_fixed_signed(-250), -2.5);
        assert_eq!(p.resolution(), 0.01);
    }

    #[test]
    fn test_deserialize() {
        let p: Precision = serde_json::from_str("1000").unwrap();
        assert_eq!(p.get(), 1000);
        assert!(serde_json::from_str::<Precision>("0").is_err());
    }
}
