//! Infrastructure - cold path only
//!
//! This module contains non-latency-critical code:
//! - Configuration management
//! - Logging
//! - Metrics

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::{Config, ConfigError, LoggingConfig, PollerConfig};
pub use metrics::{MetricsCollector, MetricsSnapshot};
