//! Ticker delta poller
//!
//! Core library: streaming ticker decoding, per-market change tracking and
//! compact binary price diffs.

pub mod codec;
pub mod core;
pub mod engine;
pub mod exchanges;
pub mod hot_path;
pub mod infrastructure;
pub mod parsing;
pub mod rest;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use infrastructure::config::{Config, LoggingConfig, PollerConfig};

use thiserror::Error;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Field `{field}` has unsupported kind {kind}")]
    UnsupportedFieldKind {
        field: &'static str,
        kind: parsing::FieldKind,
    },

    #[error("Record shape has {0} fields, at most 64 are supported")]
    ShapeTooWide(usize),

    #[error("Source read failed: {0}")]
    Source(#[source] std::io::Error),

    #[error("Body ended before the record array closed ({records} records read)")]
    IncompleteBody { records: usize },

    #[error("Codec error: {0}")]
    Codec(#[from] codec::CodecError),

    #[error("Market list error: {0}")]
    Market(#[from] core::MarketListError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
