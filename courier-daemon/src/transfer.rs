//! The transfer primitive: one message file, one connection, one delete.
//!
//! The consumer sees the raw file bytes followed by end-of-stream. There is
//! no framing, so closing the connection is what ends the message.

use std::path::Path;

use tokio::fs::{self, File};
use tokio::io::{self, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::error::TransferError;

/// Outcome of a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub bytes: u64,
}

/// Stream `message` into a fresh connection to `socket`, then remove it.
///
/// The file is opened before the connection is made, so a missing or
/// unreadable message never shows up at the consumer as an empty one. The
/// file is left in place on every failure up to and including the copy.
/// Both handles are dropped before the file is removed.
///
/// # Errors
/// One [`TransferError`] variant per failing stage.
pub async fn transfer_file(socket: &Path, message: &Path) -> Result<Delivery, TransferError> {
    let open_err = |source| TransferError::OpenSource {
        path: message.to_path_buf(),
        source,
    };

    let mut file = File::open(message).await.map_err(open_err)?;
    let metadata = file.metadata().await.map_err(open_err)?;
    if !metadata.is_file() {
        return Err(open_err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }

    let mut stream = UnixStream::connect(socket)
        .await
        .map_err(|source| TransferError::Connect {
            socket: socket.to_path_buf(),
            source,
        })?;

    let bytes = copy_and_close(&mut file, &mut stream)
        .await
        .map_err(|source| TransferError::Copy {
            path: message.to_path_buf(),
            socket: socket.to_path_buf(),
            source,
        })?;
    drop(stream);
    drop(file);

    fs::remove_file(message)
        .await
        .map_err(|source| TransferError::Remove {
            path: message.to_path_buf(),
            source,
        })?;

    Ok(Delivery { bytes })
}

async fn copy_and_close(file: &mut File, stream: &mut UnixStream) -> io::Result<u64> {
    let bytes = io::copy(file, stream).await?;
    stream.shutdown().await?;
    Ok(bytes)
}
