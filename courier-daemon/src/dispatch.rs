//! The seam between dispatchers and the transfer primitive.

use std::future::Future;
use std::path::Path;

use courier_core::SocketPath;

use crate::error::TransferError;
use crate::transfer::{transfer_file, Delivery};

/// Something that can deliver one message file.
///
/// Dispatchers only ever hold a `Deliver`, so they never know where the
/// bytes go. [`UnixSocketCourier`] is the production implementation.
pub trait Deliver: Send + Sync {
    fn deliver(
        &self,
        message: &Path,
    ) -> impl Future<Output = Result<Delivery, TransferError>> + Send;
}

/// Delivers to a fixed Unix domain socket.
#[derive(Debug, Clone)]
pub struct UnixSocketCourier {
    socket: SocketPath,
}

impl UnixSocketCourier {
    pub fn new(socket: SocketPath) -> Self {
        Self { socket }
    }
}

impl Deliver for UnixSocketCourier {
    fn deliver(
        &self,
        message: &Path,
    ) -> impl Future<Output = Result<Delivery, TransferError>> + Send {
        transfer_file(self.socket.as_path(), message)
    }
}

/// Per-dispatcher attempt counters.
///
/// `delivered` includes messages that reached the consumer but whose source
/// file could not be removed; those also count towards `failed`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    pub attempted: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Run one delivery and log the outcome. Never propagates the error.
pub(crate) async fn attempt<C: Deliver>(
    courier: &C,
    message: &Path,
    trigger: &'static str,
    stats: &mut DispatchStats,
) {
    stats.attempted += 1;
    match courier.deliver(message).await {
        Ok(delivery) => {
            stats.delivered += 1;
            tracing::info!(
                trigger,
                path = %message.display(),
                bytes = delivery.bytes,
                "successfully wrote message to socket",
            );
        }
        Err(err) => {
            stats.failed += 1;
            if err.was_delivered() {
                stats.delivered += 1;
            }
            tracing::error!(
                trigger,
                stage = err.stage(),
                delivered = err.was_delivered(),
                error = %err,
                "message transfer failed",
            );
        }
    }
}
