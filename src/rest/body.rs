//! Streaming response body
//!
//! A spawned task pulls body chunks off the HTTP response and sends them
//! through a bounded channel. `BodyReader` is the blocking `io::Read` end
//! the decoder pulls from, so at most `capacity` chunks are buffered and
//! the body is never held in memory as a whole.
//!
//! `BodyReader::read` blocks the calling thread. Run it on a blocking
//! thread (`tokio::task::spawn_blocking`), never on a runtime worker.

use bytes::{Buf, Bytes};
use std::io::{self, Read};
use tokio::sync::mpsc;

/// Sending half, fed by `pump`
pub type BodySender = mpsc::Sender<io::Result<Bytes>>;

/// Bounded body channel holding at most `capacity` chunks
pub fn body_channel(capacity: usize) -> (BodySender, BodyReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        tx,
        BodyReader {
            rx,
            chunk: Bytes::new(),
        },
    )
}

/// Blocking reader over the chunks of one response body
#[derive(Debug)]
pub struct BodyReader {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    chunk: Bytes,
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        while !self.chunk.has_remaining() {
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => self.chunk = chunk,
                Some(Err(e)) => return Err(e),
                // Sender gone: end of body
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.chunk.len());
        buf[..n].copy_from_slice(&self.chunk[..n]);
        self.chunk.advance(n);
        Ok(n)
    }
}

/// Forward `response` chunks into `tx` until the body ends
///
/// A transport error is sent as the last item. Stops early once the
/// reader is dropped.
pub async fn pump(mut response: reqwest::Response, tx: BodySender) {
    loop {
        let item = match response.chunk().await {
            Ok(Some(chunk)) => Ok(chunk),
            Ok(None) => return,
            Err(e) => Err(io::Error::other(e)),
        };
        let failed = item.is_err();
        if tx.send(item).await.is_err() || failed {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_chunks_in_order() {
        let (tx, mut body) = body_channel(4);
        tx.try_send(Ok(Bytes::from_static(b"[{\"a\":"))).unwrap();
        tx.try_send(Ok(Bytes::new())).unwrap();
        tx.try_send(Ok(Bytes::from_static(b"1}]"))).unwrap();
        drop(tx);

        let mut out = Vec::new();
        body.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"[{\"a\":1}]");
    }

    #[test]
    fn test_small_buffer_splits_chunk() {
        let (tx, mut body) = body_channel(1);
        tx.try_send(Ok(Bytes::from_static(b"abcdef"))).unwrap();
        drop(tx);

        let mut buf = [0u8; 4];
        assert_eq!(body.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(body.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(body.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_transport_error_surfaces() {
        let (tx, mut body) = body_channel(2);
        tx.try_send(Ok(Bytes::from_static(b"[1,"))).unwrap();
        tx.try_send(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
            .unwrap();
        drop(tx);

        let mut out = Vec::new();
        let err = body.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(out, b"[1,");
    }

    #[test]
    fn test_producer_thread_bounded_channel() {
        let (tx, body) = body_channel(2);
        let producer = std::thread::spawn(move || {
            for i in 0..64u8 {
                tx.blocking_send(Ok(Bytes::from(vec![i; 16]))).unwrap();
            }
        });

        let mut out = Vec::new();
        let mut body = body;
        body.read_to_end(&mut out).unwrap();
        producer.join().unwrap();
        assert_eq!(out.len(), 64 * 16);
        assert_eq!(out[16 * 5], 5);
    }
}
