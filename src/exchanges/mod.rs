//! Exchange-specific endpoints, record shapes and market lists

pub mod binance;
pub mod bitrue;
pub mod ticker;

pub use ticker::BookTicker;

use crate::core::{MarketList, MarketListError, Precision};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Exchange identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    #[default]
    Binance,
    Bitrue,
}

impl Exchange {
    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Bitrue => "bitrue",
        }
    }

    /// Exchange-info document listing tradable markets
    pub fn markets_url(&self) -> &'static str {
        match self {
            Exchange::Binance => binance::MARKETS_URL,
            Exchange::Bitrue => bitrue::MARKETS_URL,
        }
    }

    /// Ticker endpoint polled every cycle
    pub fn tickers_url(&self) -> &'static str {
        match self {
            Exchange::Binance => binance::TICKERS_URL,
            Exchange::Bitrue => bitrue::TICKERS_URL,
        }
    }

    /// Containers entered before the ticker array
    ///
    /// Both endpoints return a bare top-level array.
    pub fn ticker_level(&self) -> usize {
        1
    }

    /// Parse an exchange-info body into the tradable markets
    pub fn parse_markets(&self, body: &[u8]) -> Result<Vec<ListedMarket>> {
        match self {
            Exchange::Binance => binance::parse_markets(body),
            Exchange::Bitrue => bitrue::parse_markets(body),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Exchange {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "binance" => Ok(Exchange::Binance),
            "bitrue" => Ok(Exchange::Bitrue),
            other => Err(crate::Error::Config(format!("unknown exchange `{other}`"))),
        }
    }
}

/// A tradable market as listed by an exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ListedMarket {
    pub name: String,
    pub base: String,
    pub quote: String,
    pub precision: Precision,
}

/// Assign dense ids in listing order
pub fn into_market_list(listed: Vec<ListedMarket>) -> std::result::Result<MarketList, MarketListError> {
    MarketList::from_names(listed.into_iter().map(|m| (m.name, m.precision)))
}
