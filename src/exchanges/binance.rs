//! Binance spot endpoints
//!
//! Market precision comes from the PRICE_FILTER tick size:
//! `0.01000000` → 2 digits after the dot → precision 100.

use super::ListedMarket;
use crate::core::Precision;
use crate::{log_exchange, Error, Result};
use serde::Deserialize;

pub const MARKETS_URL: &str = "https://api.binance.com/api/v1/exchangeInfo";
pub const TICKERS_URL: &str = "https://api.binance.com/api/v3/ticker/bookTicker";

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    status: String,
    #[serde(default)]
    base_asset: String,
    #[serde(default)]
    quote_asset: String,
    #[serde(default)]
    filters: Vec<Filter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Filter {
    filter_type: String,
    #[serde(default)]
    tick_size: Option<String>,
}

/// Precision from the PRICE_FILTER tick size; 1 when absent or unusable
fn price_precision(filters: &[Filter]) -> Precision {
    filters
        .iter()
        .find(|f| f.filter_type == "PRICE_FILTER")
        .and_then(|f| f.tick_size.as_deref())
        .and_then(|tick| tick.trim().parse::<f64>().ok())
        .and_then(Precision::from_tick_size)
        .unwrap_or(Precision::ONE)
}

/// `TRADING` symbols of an exchangeInfo document, in listing order
pub fn parse_markets(body: &[u8]) -> Result<Vec<ListedMarket>> {
    let info: ExchangeInfo =
        serde_json::from_slice(body).map_err(|e| Error::Parse(format!("binance exchangeInfo: {e}")))?;

    let total = info.symbols.len();
    let markets: Vec<ListedMarket> = info
        .symbols
        .into_iter()
        .filter(|s| s.status == "TRADING")
        .map(|s| ListedMarket {
            precision: price_precision(&s.filters),
            name: s.symbol,
            base: s.base_asset,
            quote: s.quote_asset,
        })
        .collect();

    log_exchange!(
        tracing::Level::INFO,
        exchange = "binance",
        listed = total,
        trading = markets.len(),
        "Parsed exchange info"
    );
    Ok(markets)
}
