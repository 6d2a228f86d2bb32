//! Error types for courier-core.

use thiserror::Error;

/// Startup configuration problems. Any of these stops the process before a
/// dispatcher is started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No destination socket was given, or it was an empty string.
    #[error("you need to specify the full path to the socket (--socket-full-path)")]
    MissingSocketPath,

    /// Interval mode was requested but there is no message file to resend.
    #[error(
        "you need to specify the full path to the message to be sent at intervals (--message-full-path)"
    )]
    MissingMessagePath,

    /// Neither dispatcher would start with the given settings.
    #[error("nothing to do: interval mode is disabled (interval = {interval_secs}s) and no watch folder is set")]
    NothingToDo { interval_secs: i64 },
}
