//! REST API clients for market lists and ticker snapshots

pub mod body;
pub mod client;

pub use body::BodyReader;
pub use client::RestClient;
