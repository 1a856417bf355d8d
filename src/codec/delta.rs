//! Delta frame codec (Hot Path)
//!
//! One frame per poll cycle. Every changed market contributes an unsigned
//! varint triple, in ascending market id order:
//!
//! ```text
//! skip        unchanged markets since the previous triple
//! bid_fixed   trunc(bid * precision)
//! ask_diff    trunc(ask * precision) - bid_fixed
//! ```
//!
//! Unchanged markets after the last triple cost nothing: decoding stops at
//! the end of the buffer.

use super::varint::{put_uvarint, read_uvarint};
use super::CodecError;
use crate::core::{MarketList, Precision};
use crate::hot_path::MarketPriceState;
use bytes::BufMut;

/// One triple of a frame, indices resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaEntry {
    /// Dense market id
    pub index: usize,
    pub bid_fixed: u64,
    pub ask_diff: u64,
}

impl DeltaEntry {
    /// Fixed-point ask, `None` if it does not fit in u64
    #[inline(always)]
    pub fn ask_fixed(&self) -> Option<u64> {
        self.bid_fixed.checked_add(self.ask_diff)
    }
}

/// A decoded market price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPrice {
    pub index: usize,
    pub bid: f64,
    pub ask: f64,
}

/// Stateless frame encoder/decoder
pub struct DeltaCodec;

impl DeltaCodec {
    /// Encode changed states with one precision for every market
    ///
    /// `states` must be in ascending market id order, one per market.
    /// Returns the number of triples written.
    pub fn encode<'a, I, B>(states: I, precision: Precision, out: &mut B) -> usize
    where
        I: IntoIterator<Item = &'a MarketPriceState>,
        B: BufMut,
    {
        Self::encode_with(states.into_iter().map(|s| (s, precision)), out)
    }

    /// Encode changed states, each at its own market precision
    pub fn encode_with<'a, I, B>(states: I, out: &mut B) -> usize
    where
        I: IntoIterator<Item = (&'a MarketPriceState, Precision)>,
        B: BufMut,
    {
        let mut skip = 0u64;
        let mut written = 0;
        for (state, precision) in states {
            if !state.changed {
                skip += 1;
                continue;
            }
            let bid_fixed = precision.to_fixed(state.last_bid);
            // ask < bid is out of contract; clamp the diff to zero
            let ask_diff = precision.to_fixed(state.last_ask).saturating_sub(bid_fixed);
            put_uvarint(out, skip);
            put_uvarint(out, bid_fixed);
            put_uvarint(out, ask_diff);
            skip = 0;
            written += 1;
        }
        written
    }

    /// Walk the triples of `frame` without allocating
    #[inline]
    pub fn entries(frame: &[u8]) -> DeltaFrame<'_> {
        DeltaFrame::new(frame)
    }

    /// Decode a frame encoded with a single precision
    ///
    /// # Errors
    /// `MalformedFrame` on a truncated or overflowing varint, an incomplete
    /// triple, or an index/ask that overflows. No partial result is returned.
    pub fn decode(frame: &[u8], precision: Precision) -> Result<Vec<DecodedPrice>, CodecError> {
        let mut prices = Vec::new();
        for entry in Self::entries(frame) {
            let entry = entry?;
            prices.push(resolve(&entry, precision)?);
        }
        Ok(prices)
    }

    /// Decode a frame encoded with per-market precision
    ///
    /// # Errors
    /// As [`DeltaCodec::decode`], plus `MalformedFrame` for an index past
    /// the end of `markets`.
    pub fn decode_markets(frame: &[u8], markets: &MarketList) -> Result<Vec<DecodedPrice>, CodecError> {
        let mut prices = Vec::new();
        for entry in Self::entries(frame) {
            let entry = entry?;
            let market = markets
                .as_slice()
                .get(entry.index)
                .ok_or(CodecError::MalformedFrame("market index out of range"))?;
            prices.push(resolve(&entry, market.precision)?);
        }
        Ok(prices)
    }
}

#[inline]
fn resolve(entry: &DeltaEntry, precision: Precision) -> Result<DecodedPrice, CodecError> {
    let ask_fixed = entry
        .ask_fixed()
        .ok_or(CodecError::MalformedFrame("ask overflows u64"))?;
    Ok(DecodedPrice {
        index: entry.index,
        bid: precision.from_fixed(entry.bid_fixed),
        ask: precision.from_fixed(ask_fixed),
    })
}

/// Iterator over the triples of one frame
///
/// Yields `Err` once on the first malformed triple, then stops.
#[derive(Debug, Clone)]
pub struct DeltaFrame<'a> {
    buf: &'a [u8],
    next_index: usize,
    failed: bool,
}

impl<'a> DeltaFrame<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            next_index: 0,
            failed: false,
        }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> &'a [u8] {
        self.buf
    }

    #[inline]
    fn take(&mut self) -> Result<u64, CodecError> {
        let (value, n) = read_uvarint(self.buf)?;
        self.buf = &self.buf[n..];
        Ok(value)
    }

    fn next_entry(&mut self) -> Result<DeltaEntry, CodecError> {
        let skip = self.take()?;
        let index = usize::try_from(skip)
            .ok()
            .and_then(|skip| self.next_index.checked_add(skip))
            .ok_or(CodecError::MalformedFrame("market index overflows"))?;

        if self.buf.is_empty() {
            return Err(CodecError::MalformedFrame("incomplete triple"));
        }
        let bid_fixed = self.take()?;
        if self.buf.is_empty() {
            return Err(CodecError::MalformedFrame("incomplete triple"));
        }
        let ask_diff = self.take()?;

        self.next_index = index
            .checked_add(1)
            .ok_or(CodecError::MalformedFrame("market index overflows"))?;
        Ok(DeltaEntry {
            index,
            bid_fixed,
            ask_diff,
        })
    }
}

impl Iterator for DeltaFrame<'_> {
    type Item = Result<DeltaEntry, CodecError>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.buf.is_empty() {
            return None;
        }
        let entry = self.next_entry();
        self.failed = entry.is_err();
        Some(entry)
    }
}

// ============================================================================
// HFT Hot Path Checklist
// ============================================================================
//
// ✓ encode writes straight into the caller's BufMut, no scratch buffer
// ✓ DeltaFrame walks a borrowed slice, no allocation
// ✓ All index/ask arithmetic is checked on decode
// ✓ No panics on malformed input
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Market;

    fn changed(bid: f64, ask: f64) -> MarketPriceState {
        MarketPriceState {
            last_bid: bid,
            last_ask: ask,
            changed: true,
        }
    }

    fn p100() -> Precision {
        Precision::new(100).unwrap()
    }

    #[test]
    fn test_concrete_frame() {
        let mut states = vec![MarketPriceState::default(); 5];
        states[3] = changed(123.45, 123.50);

        let mut out = Vec::new();
        assert_eq!(DeltaCodec::encode(&states, p100(), &mut out), 1);
        assert_eq!(out, [0x03, 0xB9, 0x60, 0x05]);

        let decoded = DeltaCodec::decode(&out, p100()).unwrap();
        assert_eq!(
            decoded,
            [DecodedPrice {
                index: 3,
                bid: 123.45,
                ask: 123.50
            }]
        );
    }

    #[test]
    fn test_no_changes_is_empty_frame() {
        let states = vec![MarketPriceState::default(); 8];
        let mut out = Vec::new();
        assert_eq!(DeltaCodec::encode(&states, p100(), &mut out), 0);
        assert!(out.is_empty());
        assert!(DeltaCodec::decode(&out, p100()).unwrap().is_empty());
    }

    #[test]
    fn test_skip_runs() {
        let mut states = vec![MarketPriceState::default(); 20];
        for i in [0, 2, 7, 8, 19] {
            states[i] = changed(i as f64, i as f64 + 1.0);
        }
        let mut out = Vec::new();
        DeltaCodec::encode(&states, Precision::ONE, &mut out);

        let indices: Vec<_> = DeltaCodec::entries(&out).map(|e| e.unwrap().index).collect();
        assert_eq!(indices, [0, 2, 7, 8, 19]);
        // skips: 0, 1, 4, 0, 10
        let skips: Vec<u8> = out.chunks(3).map(|c| c[0]).collect();
        assert_eq!(skips, [0, 1, 4, 0, 10]);
    }

    #[test]
    fn test_ask_below_bid_clamps() {
        let states = [changed(5.0, 4.0)];
        let mut out = Vec::new();
        DeltaCodec::encode(&states, Precision::ONE, &mut out);
        assert_eq!(out, [0, 5, 0]);
    }

    #[test]
    fn test_truncates_toward_zero() {
        let states = [changed(1.239, 1.2499)];
        let mut out = Vec::new();
        DeltaCodec::encode(&states, p100(), &mut out);
        // bid 123, ask 124
        assert_eq!(out, [0, 123, 1]);
    }

    #[test]
    fn test_per_market_precision() {
        let markets = MarketList::from_markets(vec![
            Market::new(0, "A", Precision::new(10).unwrap()),
            Market::new(1, "B", Precision::new(1000).unwrap()),
        ])
        .unwrap();
        let states = [changed(1.5, 1.6), changed(0.123, 0.125)];

        let mut out = Vec::new();
        let n = DeltaCodec::encode_with(
            markets.iter().zip(states.iter()).map(|(m, s)| (s, m.precision)),
            &mut out,
        );
        assert_eq!(n, 2);

        let decoded = DeltaCodec::decode_markets(&out, &markets).unwrap();
        assert_eq!(decoded[0].bid, 1.5);
        assert_eq!(decoded[1].index, 1);
        assert!((decoded[1].ask - 0.125).abs() < 0.001 + f64::EPSILON);
    }

    #[test]
    fn test_index_out_of_range() {
        let markets = MarketList::from_names([("A", Precision::ONE)]).unwrap();
        let frame = [4, 1, 1];
        assert!(matches!(
            DeltaCodec::decode_markets(&frame, &markets),
            Err(CodecError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_incomplete_triple() {
        for frame in [&[0x03][..], &[0x03, 0xB9, 0x60][..], &[0x03, 0xB9][..]] {
            let err = DeltaCodec::decode(frame, p100()).unwrap_err();
            assert!(err.is_malformed(), "{frame:?}");
        }
    }

    #[test]
    fn test_bad_varint_stops_iteration() {
        let frame = [0, 1, 1, 0x80];
        let mut entries = DeltaCodec::entries(&frame);
        assert!(entries.next().unwrap().is_ok());
        assert!(entries.next().unwrap().is_err());
        assert!(entries.next().is_none());
    }

    #[test]
    fn test_ask_overflow() {
        let mut frame = Vec::new();
        put_uvarint(&mut frame, 0);
        put_uvarint(&mut frame, u64::MAX);
        put_uvarint(&mut frame, 1);
        assert!(DeltaCodec::decode(&frame, Precision::ONE).is_err());
    }

    #[test]
    fn test_index_at_usize_max_is_malformed() {
        let mut frame = Vec::new();
        put_uvarint(&mut frame, u64::MAX);
        put_uvarint(&mut frame, 1);
        put_uvarint(&mut frame, 1);

        let err = DeltaCodec::decode(&frame, Precision::ONE).unwrap_err();
        assert!(matches!(err, CodecError::MalformedFrame(_)));

        let mut entries = DeltaCodec::entries(&frame);
        assert!(entries.next().unwrap().is_err());
        assert!(entries.next().is_none());
    }
}
