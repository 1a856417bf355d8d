//! Best-effort numeric parsing from raw JSON bytes
//!
//! Never fails: text that is not a number parses as 0.0.

/// Exact powers of ten representable as f64
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

/// Mantissas up to 2^53 convert to f64 exactly
const MAX_EXACT_MANTISSA: u64 = 1 << 53;

/// Parse a float from bytes, accepting quoted or bare forms
///
/// Plain decimals with at most 15-16 significant digits take a fast exact
/// path (one correctly rounded multiply or divide). Exponents, long
/// mantissas and special values fall back to the standard parser.
/// Anything unparseable yields 0.0.
#[inline]
pub fn parse_f64_best_effort(bytes: &[u8]) -> f64 {
    let bytes = strip_quotes(bytes.trim_ascii());
    if bytes.is_empty() {
        return 0.0;
    }

    if let Some(value) = parse_simple_decimal(bytes) {
        return value;
    }

    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// `[-+]digits[.digits]` with an exactly representable mantissa
#[inline]
fn parse_simple_decimal(bytes: &[u8]) -> Option<f64> {
    let (negative, mut i) = match bytes[0] {
        b'-' => (true, 1),
        b'+' => (false, 1),
        _ => (false, 0),
    };

    let mut mantissa: u64 = 0;
    let mut scale: usize = 0;
    let mut digits = 0usize;
    let mut seen_dot = false;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'0'..=b'9' => {
                mantissa = mantissa.checked_mul(10)?.checked_add((c - b'0') as u64)?;
                digits += 1;
                if seen_dot {
                    scale += 1;
                }
            }
            b'.' if !seen_dot => seen_dot = true,
            _ => return None,
        }
        i += 1;
    }

    if digits == 0 || mantissa > MAX_EXACT_MANTISSA || scale >= POW10.len() {
        return None;
    }

    let value = mantissa as f64 / POW10[scale];
    Some(if negative { -value } else { value })
}

/// Strip one pair of surrounding quotes; a lone leading quote is dropped too
#[inline]
pub fn strip_quotes(bytes: &[u8]) -> &[u8] {
    match bytes {
        [b'"', inner @ .., b'"'] => inner,
        [b'"', rest @ ..] => rest,
        _ => bytes,
    }
}
