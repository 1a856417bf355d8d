//! Bitrue spot endpoints
//!
//! Market precision is `10^quotePrecision`.

use super::ListedMarket;
use crate::core::Precision;
use crate::{log_exchange, Error, Result};
use serde::Deserialize;

pub const MARKETS_URL: &str = "https://openapi.bitrue.com/api/v1/exchangeInfo";
pub const TICKERS_URL: &str = "https://openapi.bitrue.com/api/v1/ticker/24hr";

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
    quote_precision: u8,
}

/// `TRADING` symbols of an exchangeInfo document, in listing order
///
/// Symbols whose precision overflows u64 are skipped.
pub fn parse_markets(body: &[u8]) -> Result<Vec<ListedMarket>> {
    let info: ExchangeInfo =
        serde_json::from_slice(body).map_err(|e| Error::Parse(format!("bitrue exchangeInfo: {e}")))?;

    let mut markets = Vec::with_capacity(info.symbols.len());
    for s in info.symbols.into_iter().filter(|s| s.status == "TRADING") {
        let Some(precision) = Precision::from_decimals(s.quote_precision) else {
            log_exchange!(
                tracing::Level::WARN,
                exchange = "bitrue",
                symbol = %s.symbol,
                quote_precision = s.quote_precision,
                "Skipping market with unrepresentable precision"
            );
            continue;
        };
        markets.push(ListedMarket {
            name: s.symbol,
            base: s.base_asset,
            quote: s.quote_asset,
            precision,
        });
    }
    Ok(markets)
}
