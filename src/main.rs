//! Ticker delta poller
//!
//! # Architecture
//! - **parsing**: streaming record decoder over the raw ticker body
//! - **hot_path**: per-market change tracking
//! - **codec**: delta frames and float series
//! - **exchanges** / **rest**: endpoints, market lists, HTTP client
//! - **infrastructure**: config, logging, metrics (cold path)
//!
//! Loads the market list once, then polls the ticker endpoint on a fixed
//! interval and appends every non-empty frame, u32 BE length prefixed, to
//! the output file. Each body is decoded on a blocking thread as it
//! streams in.

use bytes::BytesMut;
use std::sync::Arc;
use ticker_delta::engine::{append_length_prefixed, PollSession};
use ticker_delta::infrastructure::logging::init_logging;
use ticker_delta::infrastructure::MetricsCollector;
use ticker_delta::rest::RestClient;
use ticker_delta::{log_poll, Config};
use tokio::io::AsyncWriteExt;
use tokio::time::MissedTickBehavior;
use tracing::Level;

/// Cycles between metrics log lines
const METRICS_EVERY: u64 = 60;

/// Body chunks buffered ahead of the decoder
const BODY_CHUNKS: usize = 8;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _guards = init_logging(&config.logging)?;

    let exchange = config.poller.exchange;
    tracing::info!(%exchange, output = %config.poller.output.display(), "Starting poller");

    let client = RestClient::new(&config.poller)?;
    let markets = client.fetch_markets(exchange).await?;
    if markets.is_empty() {
        anyhow::bail!("{exchange} lists no trading markets");
    }

    let metrics = Arc::new(MetricsCollector::new());
    let mut session = PollSession::new(exchange, markets, config.parser, metrics.clone())?;

    let mut output = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.poller.output)
        .await?;

    let mut interval = tokio::time::interval(config.poller.interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frame = BytesMut::with_capacity(4096);
    let mut record = BytesMut::with_capacity(4096);
    let mut cycle = 0u64;

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown requested");
                break;
            }
        }
        cycle += 1;

        frame.clear();
        match client.stream_tickers(exchange, BODY_CHUNKS).await {
            Ok(body) => {
                let (returned, buf, result) = tokio::task::spawn_blocking(move || {
                    let result = session.run_cycle(body, &mut frame);
                    (session, frame, result)
                })
                .await?;
                session = returned;
                frame = buf;

                // Failures are logged and counted by the session
                if let Ok(report) = result {
                    if report.changed > 0 {
                        record.clear();
                        append_length_prefixed(&frame, &mut record)?;
                        output.write_all(&record).await?;
                    }
                }
            }
            Err(e) => session.record_dropped(&e),
        }

        if cycle % METRICS_EVERY == 0 {
            let m = metrics.snapshot();
            log_poll!(
                Level::INFO,
                completed = m.cycles_completed,
                dropped = m.cycles_dropped,
                records = m.records_decoded,
                changed = m.markets_changed,
                bytes = m.bytes_emitted,
                truncated = m.tokens_truncated,
                rate = m.cycle_rate,
                "Poller metrics"
            );
        }
    }

    output.flush().await?;
    Ok(())
}
