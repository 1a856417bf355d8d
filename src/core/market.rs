//! Tracked markets
//!
//! Markets get dense ids 0..N-1 once per session. The id is the position
//! used by skip-run encoding, so the list is immutable after construction.

use crate::core::Precision;
use std::collections::HashMap;

/// Dense market index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct MarketId(u32);

impl MarketId {
    #[inline(always)]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_raw(&self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A tracked market
#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: MarketId,
    pub name: String,
    pub precision: Precision,
}

impl Market {
    pub fn new(id: u32, name: impl Into<String>, precision: Precision) -> Self {
        Self {
            id: MarketId::from_raw(id),
            name: name.into(),
            precision,
        }
    }
}

/// Ordered, validated set of markets with name lookup
#[derive(Debug, Clone, Default)]
pub struct MarketList {
    markets: Vec<Market>,
    by_name: HashMap<String, MarketId>,
}

impl MarketList {
    /// Assign ids in iteration order
    pub fn from_names<I, S>(entries: I) -> Result<Self, MarketListError>
    where
        I: IntoIterator<Item = (S, Precision)>,
        S: Into<String>,
    {
        let markets = entries
            .into_iter()
            .enumerate()
            .map(|(i, (name, precision))| Market::new(i as u32, name, precision))
            .collect();
        Self::from_markets(markets)
    }

    /// Build from markets carrying explicit ids
    ///
    /// Ids must be exactly 0..N-1 (any order); names must be unique.
    pub fn from_markets(mut markets: Vec<Market>) -> Result<Self, MarketListError> {
        markets.sort_by_key(|m| m.id);

        let mut by_name = HashMap::with_capacity(markets.len());
        for (expected, market) in markets.iter().enumerate() {
            if market.id.index() != expected {
                return Err(MarketListError::NonDenseId(market.id.as_raw()));
            }
            if by_name.insert(market.name.clone(), market.id).is_some() {
                return Err(MarketListError::DuplicateName(market.name.clone()));
            }
        }

        Ok(Self { markets, by_name })
    }

    #[inline]
    pub fn get(&self, id: MarketId) -> Option<&Market> {
        self.markets.get(id.index())
    }

    #[inline]
    pub fn id_of(&self, name: &str) -> Option<MarketId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.markets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Markets in ascending id order
    pub fn iter(&self) -> std::slice::Iter<'_, Market> {
        self.markets.iter()
    }

    pub fn as_slice(&self) -> &[Market] {
        &self.markets
    }
}

impl<'a> IntoIterator for &'a MarketList {
    type Item = &'a Market;
    type IntoIter = std::slice::Iter<'a, Market>;

    fn into_iter(self) -> Self::IntoIter {
        self.markets.iter()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MarketListError {
    #[error("Duplicate market name: {0}")]
    DuplicateName(String),
    #[error("Market ids must be dense 0..N-1, found {0}")]
    NonDenseId(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(scale: u64) -> Precision {
        Precision::new(scale).unwrap()
    }

    #[test]
    fn test_from_names_assigns_dense_ids() {
        let list = MarketList::from_names([("BTCUSDT", p(100)), ("ETHUSDT", p(100))]).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.id_of("ETHUSDT"), Some(MarketId::from_raw(1)));
        assert_eq!(list.get(MarketId::from_raw(0)).unwrap().name, "BTCUSDT");
        assert_eq!(list.id_of("XRPUSDT"), None);
    }

    #[test]
    fn test_from_markets_sorts_by_id() {
        let list = MarketList::from_markets(vec![
            Market::new(1, "ETHUSDT", p(100)),
            Market::new(0, "BTCUSDT", p(10)),
        ])
        .unwrap();
        let names: Vec<&str> = list.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn test_gap_in_ids_rejected() {
        let err = MarketList::from_markets(vec![
            Market::new(0, "BTCUSDT", p(10)),
            Market::new(2, "ETHUSDT", p(10)),
        ])
        .unwrap_err();
        assert_eq!(err, MarketListError::NonDenseId(2));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = MarketList::from_names([("BTCUSDT", p(10)), ("BTCUSDT", p(10))]).unwrap_err();
        assert_eq!(err, MarketListError::DuplicateName("BTCUSDT".into()));
    }
}
