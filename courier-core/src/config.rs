//! Raw relay configuration and its validation.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::types::{IntervalPlan, RelayPlan, SocketPath, WatchPlan};

/// Seconds between interval-mode attempts when none is given.
pub const DEFAULT_INTERVAL_SECS: i64 = 10;

/// Default pause between a create event and its transfer, in milliseconds.
pub const DEFAULT_SETTLE_MS: u64 = 50;

/// [`DEFAULT_SETTLE_MS`] as a [`Duration`].
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(DEFAULT_SETTLE_MS);

/// User-supplied settings, before any checks. Empty paths count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub socket: Option<PathBuf>,
    pub message: Option<PathBuf>,
    /// Non-positive values disable interval mode.
    pub interval_secs: i64,
    pub watch_dir: Option<PathBuf>,
    pub settle: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            socket: None,
            message: None,
            interval_secs: DEFAULT_INTERVAL_SECS,
            watch_dir: None,
            settle: DEFAULT_SETTLE,
        }
    }
}

impl RelayConfig {
    /// Decide which dispatchers run.
    ///
    /// Interval mode needs a positive interval and a message path. Watch mode
    /// needs a watch directory. A positive interval without a message path is
    /// an error unless watch mode is enabled, in which case interval mode is
    /// skipped and flagged on the plan.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the socket is missing or when no
    /// dispatcher would start.
    pub fn validate(self) -> Result<RelayPlan, ConfigError> {
        let socket = non_empty(self.socket).ok_or(ConfigError::MissingSocketPath)?;
        let message = non_empty(self.message);
        let watch = non_empty(self.watch_dir).map(|dir| WatchPlan {
            dir,
            settle: self.settle,
        });

        let mut skipped_interval = false;
        let interval = match message {
            Some(message) if self.interval_secs > 0 => Some(IntervalPlan {
                message,
                period: Duration::from_secs(self.interval_secs.unsigned_abs()),
            }),
            None if self.interval_secs > 0 => {
                if watch.is_none() {
                    return Err(ConfigError::MissingMessagePath);
                }
                skipped_interval = true;
                None
            }
            _ => None,
        };

        if interval.is_none() && watch.is_none() {
            return Err(ConfigError::NothingToDo {
                interval_secs: self.interval_secs,
            });
        }

        Ok(RelayPlan {
            socket: SocketPath(socket),
            interval,
            watch,
            skipped_interval,
        })
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}
