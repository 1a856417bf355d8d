//! HTTP client for exchange REST endpoints (Cold Path)
//!
//! One explicitly constructed client per poller. HTTP/2 is negotiated via
//! ALPN, cookies persist across requests and gzip/deflate/brotli bodies
//! are decoded before they reach the parser.
//!
//! Market lists are small and read whole. Ticker bodies are streamed
//! chunk by chunk into a `BodyReader`.

use super::body::{self, BodyReader};
use crate::core::MarketList;
use crate::exchanges::{self, Exchange};
use crate::infrastructure::PollerConfig;
use crate::{log_exchange, Error, Result};
use bytes::Bytes;
use std::time::Duration;
use tracing::Level;

/// REST client
#[derive(Debug, Clone)]
pub struct RestClient {
    client: reqwest::Client,
}

impl RestClient {
    /// Build from poller settings
    pub fn new(config: &PollerConfig) -> Result<Self> {
        Self::with_options(config.timeout(), &config.user_agent)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// GET `url`, returning the response once its headers are in
    ///
    /// # Errors
    /// `Http` on transport failure, `Status` on a non-2xx response.
    pub async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }
        Ok(response)
    }

    /// GET `url` and return the whole decoded body
    pub async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        self.get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| Error::Http(e.to_string()))
    }

    /// Fetch the exchange's tradable markets and assign dense ids
    pub async fn fetch_markets(&self, exchange: Exchange) -> Result<MarketList> {
        let url = exchange.markets_url();
        log_exchange!(Level::INFO, %exchange, url, "Fetching market list");

        let body = self.get_bytes(url).await?;
        let listed = exchange.parse_markets(&body)?;
        let markets = exchanges::into_market_list(listed)?;

        log_exchange!(Level::INFO, %exchange, markets = markets.len(), "Market list loaded");
        Ok(markets)
    }

    /// Open one ticker snapshot and stream its body
    ///
    /// At most `chunks` body chunks are buffered ahead of the reader.
    /// Errors after the headers arrive surface as read errors on the
    /// returned reader. Must be called inside a tokio runtime.
    pub async fn stream_tickers(&self, exchange: Exchange, chunks: usize) -> Result<BodyReader> {
        let response = self.get(exchange.tickers_url()).await?;
        let (tx, reader) = body::body_channel(chunks);
        tokio::spawn(body::pump(response, tx));
        Ok(reader)
    }
}
