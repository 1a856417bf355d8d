//! Test helpers: byte sources with controlled read boundaries, sample markets

use crate::core::{MarketList, Precision};
use std::io::{self, Read};

/// Yields at most `chunk` bytes per read
pub struct ChunkedReader<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> ChunkedReader<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self {
            data,
            chunk: chunk.max(1),
        }
    }
}

impl Read for ChunkedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Chunked reader that fails with `ConnectionReset` once the data runs out
pub struct FailingReader<'a> {
    inner: ChunkedReader<'a>,
}

impl<'a> FailingReader<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self {
            inner: ChunkedReader::new(data, chunk),
        }
    }
}

impl Read for FailingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.inner.data.is_empty() {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
        }
        self.inner.read(buf)
    }
}

/// Markets "M0".."M{n-1}", precision 100
pub fn sample_markets(n: usize) -> MarketList {
    let precision = Precision::new(100).expect("non-zero");
    MarketList::from_names((0..n).map(|i| (format!("M{i}"), precision))).expect("unique names")
}
