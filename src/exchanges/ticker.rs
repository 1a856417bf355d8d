//! Book ticker record shape (Hot Path)

use crate::core::InlineStr;
use crate::hot_path::PriceSink;
use crate::parsing::{FieldDesc, Record};

/// Best bid/ask for one symbol, as both exchanges publish it
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BookTicker {
    pub symbol: InlineStr,
    pub bid: f64,
    pub ask: f64,
}

impl Record for BookTicker {
    const FIELDS: &'static [FieldDesc] = &[
        FieldDesc::string("symbol"),
        FieldDesc::float64("bidPrice"),
        FieldDesc::float64("askPrice"),
    ];

    #[inline]
    fn set_str(&mut self, _slot: usize, value: &[u8]) {
        self.symbol.set(value);
    }

    #[inline]
    fn set_f64(&mut self, slot: usize, value: f64) {
        match slot {
            1 => self.bid = value,
            _ => self.ask = value,
        }
    }
}

impl BookTicker {
    /// Both sides carry a positive price
    #[inline(always)]
    pub fn is_quoted(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0
    }

    /// Write to `sink` if quoted; returns whether it was written
    #[inline]
    pub fn forward<S: PriceSink + ?Sized>(&self, sink: &mut S) -> bool {
        if !self.is_quoted() {
            return false;
        }
        sink.write(self.symbol.as_str(), self.bid, self.ask);
        true
    }
}
