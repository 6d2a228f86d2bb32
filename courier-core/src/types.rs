//! Domain types for the relay.
//!
//! All path fields use `PathBuf`. A validated plan never carries an empty path.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Filesystem path of the destination Unix domain socket.
///
/// Set once at startup and only ever read afterwards, so it is shared by
/// cloning rather than locking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SocketPath(pub PathBuf);

impl SocketPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SocketPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

impl AsRef<Path> for SocketPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<&str> for SocketPath {
    fn from(s: &str) -> Self {
        Self(PathBuf::from(s))
    }
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

/// Settings for the interval sender: resend one file every `period`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalPlan {
    pub message: PathBuf,
    pub period: Duration,
}

/// Settings for the watch sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPlan {
    /// Directory observed for top-level create events.
    pub dir: PathBuf,
    /// Pause between a create event and the transfer it triggers.
    pub settle: Duration,
}

/// Validated configuration: at least one of `interval` and `watch` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayPlan {
    pub socket: SocketPath,
    pub interval: Option<IntervalPlan>,
    pub watch: Option<WatchPlan>,
    /// A positive interval was configured without a message file, and watch
    /// mode carries the process on its own.
    pub skipped_interval: bool,
}

impl RelayPlan {
    /// Names of the dispatchers this plan starts, in start order.
    pub fn modes(&self) -> Vec<&'static str> {
        let mut modes = Vec::with_capacity(2);
        if self.interval.is_some() {
            modes.push("interval");
        }
        if self.watch.is_some() {
            modes.push("watch");
        }
        modes
    }
}
