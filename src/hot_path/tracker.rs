//! Market Price Tracker (Hot Path)
//!
//! Keeps the last bid/ask per tracked market and flags markets whose price
//! changed on their latest write. The delta encoder reads the flags.
//!
//! HFT: states live in a Vec indexed by dense market id, name lookup is a
//! single hash lookup, writes never allocate.

use crate::codec::DeltaCodec;
use crate::core::{Market, MarketId, MarketList};
use bytes::BufMut;

/// Per-market price state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MarketPriceState {
    pub last_bid: f64,
    pub last_ask: f64,
    /// Price differs from the value stored before the latest write
    pub changed: bool,
}

impl MarketPriceState {
    /// Store a new price and recompute `changed` against the previous one
    ///
    /// Exact float comparison: any bit-level difference counts as a change.
    #[inline(always)]
    pub fn update(&mut self, bid: f64, ask: f64) {
        self.changed = bid != self.last_bid || ask != self.last_ask;
        self.last_bid = bid;
        self.last_ask = ask;
    }
}

/// Receives decoded prices keyed by exchange symbol
pub trait PriceSink {
    fn write(&mut self, name: &str, bid: f64, ask: f64);
}

/// Change tracker over a fixed market set
///
/// There is no reset step. Each write recomputes its market's flag, so
/// encode exactly once per poll cycle, right after the cycle's writes.
/// A market not written during a cycle keeps the flag from its last write.
pub struct MarketPriceTracker {
    markets: MarketList,
    states: Vec<MarketPriceState>,
}

impl MarketPriceTracker {
    /// States start at zero price, unchanged
    pub fn new(markets: MarketList) -> Self {
        let states = vec![MarketPriceState::default(); markets.len()];
        Self { markets, states }
    }

    /// Record a price for `name`; unknown names are ignored
    ///
    /// Returns the market id when the name is tracked.
    #[inline]
    pub fn write(&mut self, name: &str, bid: f64, ask: f64) -> Option<MarketId> {
        let id = self.markets.id_of(name)?;
        self.states[id.index()].update(bid, ask);
        Some(id)
    }

    #[inline]
    pub fn state(&self, id: MarketId) -> Option<&MarketPriceState> {
        self.states.get(id.index())
    }

    pub fn state_by_name(&self, name: &str) -> Option<&MarketPriceState> {
        self.state(self.markets.id_of(name)?)
    }

    pub fn markets(&self) -> &MarketList {
        &self.markets
    }

    /// Number of markets currently flagged changed
    pub fn changed_count(&self) -> usize {
        self.states.iter().filter(|s| s.changed).count()
    }

    /// States in ascending id order
    #[inline]
    pub fn states(&self) -> &[MarketPriceState] {
        &self.states
    }

    /// Overwrite every state, e.g. to roll back a dropped cycle
    ///
    /// Returns false, leaving states untouched, if the length differs.
    pub fn restore_states(&mut self, saved: &[MarketPriceState]) -> bool {
        if saved.len() != self.states.len() {
            return false;
        }
        self.states.copy_from_slice(saved);
        true
    }

    /// (market, state) pairs in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (&Market, &MarketPriceState)> {
        self.markets.iter().zip(self.states.iter())
    }

    /// Encode the changed markets, each at its own precision
    ///
    /// Returns the number of markets written to the frame.
    pub fn encode_changes<B: BufMut>(&self, out: &mut B) -> usize {
        DeltaCodec::encode_with(
            self.iter().map(|(market, state)| (state, market.precision)),
            out,
        )
    }
}

impl PriceSink for MarketPriceTracker {
    #[inline]
    fn write(&mut self, name: &str, bid: f64, ask: f64) {
        MarketPriceTracker::write(self, name, bid, ask);
    }
}
