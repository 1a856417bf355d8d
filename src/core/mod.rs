//! Core types shared by the parsing pipeline and the codecs
//!
//! - Precision: float ↔ fixed-point scale
//! - Market / MarketList: dense market ids assigned at session start
//! - InlineStr: fixed-capacity storage for decoded string fields

pub mod fixed_point;
pub mod inline_str;
pub mod market;

pub use fixed_point::Precision;
pub use inline_str::{InlineStr, DEFAULT_STR_CAPACITY};
pub use market::{Market, MarketId, MarketList, MarketListError};
