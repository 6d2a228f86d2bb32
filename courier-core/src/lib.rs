//! Courier core library — relay configuration, validated plans, errors.
//!
//! - [`types`] — socket path newtype and per-dispatcher plans
//! - [`config`] — raw [`RelayConfig`] and its validation into a [`RelayPlan`]
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::{RelayConfig, DEFAULT_INTERVAL_SECS, DEFAULT_SETTLE, DEFAULT_SETTLE_MS};
pub use error::ConfigError;
pub use types::{IntervalPlan, RelayPlan, SocketPath, WatchPlan};
