//! Hot path operations - zero allocation, zero panic
//!
//! Per-cycle price change detection:
//! - MarketPriceTracker: last bid/ask and changed flag per market
//! - PriceSink: the write interface exchange fetchers feed

pub mod tracker;

pub use tracker::{MarketPriceState, MarketPriceTracker, PriceSink};
