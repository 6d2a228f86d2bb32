use std::path::PathBuf;

use thiserror::Error;

/// Why a single delivery attempt failed.
///
/// Every variant is recoverable: the dispatcher logs it and keeps going.
/// Only [`TransferError::Remove`] happens after the bytes reached the socket.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("could not open socket {socket} for writing: {source}")]
    Connect {
        socket: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open message file {path} for reading: {source}")]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copying {path} to socket {socket} failed: {source}")]
    Copy {
        path: PathBuf,
        socket: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("message {path} was delivered but could not be removed: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TransferError {
    /// True when the consumer already received the full message.
    pub fn was_delivered(&self) -> bool {
        matches!(self, TransferError::Remove { .. })
    }

    /// Short label for the stage that failed, used as a log field.
    pub fn stage(&self) -> &'static str {
        match self {
            TransferError::Connect { .. } => "connect",
            TransferError::OpenSource { .. } => "open",
            TransferError::Copy { .. } => "copy",
            TransferError::Remove { .. } => "remove",
        }
    }
}

/// Error surface for the relay runtime.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to watch {dir}: {source}")]
    Subscribe {
        dir: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("{task} task join failure: {message}")]
    TaskJoin { task: &'static str, message: String },

    #[error("signal handler failed: {0}")]
    Signal(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RelayError {
    RelayError::Io {
        path: path.into(),
        source,
    }
}
