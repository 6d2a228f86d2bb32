//! Courier relay runtime: transfer primitive, interval and watch senders.

mod dispatch;
mod error;
pub mod interval;
pub mod logging;
mod runtime;
pub mod transfer;
pub mod watch;

pub use dispatch::{Deliver, DispatchStats, UnixSocketCourier};
pub use error::{RelayError, TransferError};
pub use logging::{init_tracing, LogFormat};
pub use runtime::{run, run_with_shutdown, start_blocking, RelaySummary};
pub use transfer::{transfer_file, Delivery};
