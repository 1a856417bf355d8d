//! Poll session engine
//!
//! One session per exchange owns the full pipeline: record schema, decode
//! limits and the price tracker. A cycle decodes one ticker body, forwards
//! quoted records to the tracker and encodes the changed markets.
//!
//! A cycle that fails is dropped: no frame bytes are emitted and tracker
//! state is rolled back to where it was before the cycle started.

use crate::codec::DeltaCodec;
use crate::core::MarketList;
use crate::exchanges::{BookTicker, Exchange};
use crate::hot_path::{MarketPriceState, MarketPriceTracker};
use crate::infrastructure::MetricsCollector;
use crate::parsing::{RecordDecoder, Schema, StreamLimits};
use crate::{log_poll, Error, Result};
use bytes::{Buf, BufMut, BytesMut};
use std::convert::Infallible;
use std::io::{self, Read};
use std::sync::Arc;
use tracing::Level;

/// Outcome of one completed cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records decoded from the body
    pub records: usize,
    /// Records with both sides quoted, written to the tracker
    pub forwarded: usize,
    /// Triples in the emitted frame
    pub changed: usize,
    /// Frame length in bytes
    pub bytes: usize,
    /// Keys and values cut at the spill capacity
    pub truncated: u64,
}

/// Decode → track → encode pipeline for one exchange
pub struct PollSession {
    exchange: Exchange,
    schema: Schema<BookTicker>,
    tracker: MarketPriceTracker,
    limits: StreamLimits,
    metrics: Arc<MetricsCollector>,
    /// Tracker states at cycle start, reused across cycles
    saved: Vec<MarketPriceState>,
    cycles: u64,
}

impl PollSession {
    pub fn new(
        exchange: Exchange,
        markets: MarketList,
        limits: StreamLimits,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        let schema = Schema::build()?;
        let saved = Vec::with_capacity(markets.len());
        Ok(Self {
            exchange,
            schema,
            tracker: MarketPriceTracker::new(markets),
            limits,
            metrics,
            saved,
            cycles: 0,
        })
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn tracker(&self) -> &MarketPriceTracker {
        &self.tracker
    }

    pub fn markets(&self) -> &MarketList {
        self.tracker.markets()
    }

    /// Run one cycle over `body`, appending the frame to `out`
    ///
    /// # Errors
    /// `Source` if reading the body failed, `IncompleteBody` if it ended
    /// before the record array closed. Either way nothing is appended to
    /// `out` and the tracker is left as before the call.
    pub fn run_cycle<R: Read>(&mut self, body: R, out: &mut BytesMut) -> Result<CycleReport> {
        self.cycles += 1;
        self.saved.clear();
        self.saved.extend_from_slice(self.tracker.states());

        let mut forwarded = 0;
        let mut decoder = RecordDecoder::with_limits(
            &self.schema,
            body,
            self.exchange.ticker_level(),
            &self.limits,
        );
        let tracker = &mut self.tracker;
        let records = decoder
            .read(|ticker| {
                if ticker.forward(&mut *tracker) {
                    forwarded += 1;
                }
                Ok::<_, Infallible>(())
            })
            .unwrap_or_else(|never| match never {});

        let truncated = decoder.truncated_tokens();
        let failure = match decoder.take_source_error() {
            Some(err) => Some(Error::Source(err)),
            None if !decoder.completed() => Some(Error::IncompleteBody { records }),
            None => None,
        };
        self.metrics.record_truncated(truncated);

        if let Some(err) = failure {
            self.tracker.restore_states(&self.saved);
            self.metrics.record_dropped();
            log_poll!(
                Level::WARN,
                exchange = %self.exchange,
                cycle = self.cycles,
                records,
                error = %err,
                "Dropping cycle: ticker body incomplete"
            );
            return Err(err);
        }
        if truncated > 0 {
            log_poll!(
                Level::DEBUG,
                exchange = %self.exchange,
                cycle = self.cycles,
                truncated,
                "Tokens cut at spill capacity"
            );
        }

        let start = out.len();
        let changed = self.tracker.encode_changes(out);
        let bytes = out.len() - start;

        self.metrics.record_cycle(records, changed, bytes);
        log_poll!(
            Level::DEBUG,
            exchange = %self.exchange,
            cycle = self.cycles,
            records,
            forwarded,
            changed,
            bytes,
            "Cycle complete"
        );

        Ok(CycleReport {
            records,
            forwarded,
            changed,
            bytes,
            truncated,
        })
    }

    /// Count a cycle that failed before decoding began (fetch error)
    pub fn record_dropped(&mut self, err: &Error) {
        self.cycles += 1;
        self.metrics.record_dropped();
        log_poll!(
            Level::WARN,
            exchange = %self.exchange,
            cycle = self.cycles,
            error = %err,
            "Dropping cycle: fetch failed"
        );
    }

    /// Decode a frame produced by this session's tracker
    pub fn decode_frame(&self, frame: &[u8]) -> Result<Vec<crate::codec::DecodedPrice>> {
        Ok(DeltaCodec::decode_markets(frame, self.markets())?)
    }
}

/// Append `frame` with a u32 big-endian length prefix
pub fn append_length_prefixed<B: BufMut>(frame: &[u8], out: &mut B) -> io::Result<()> {
    let len = u32::try_from(frame.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "frame longer than u32::MAX"))?;
    out.put_u32(len);
    out.put_slice(frame);
    Ok(())
}

/// Split the first length-prefixed frame off `buf`
///
/// Returns `None` when `buf` holds no complete frame.
pub fn split_length_prefixed(buf: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut header = buf.get(..4)?;
    let len = header.get_u32() as usize;
    let end = len.checked_add(4)?;
    let frame = buf.get(4..end)?;
    Some((frame, &buf[end..]))
}
