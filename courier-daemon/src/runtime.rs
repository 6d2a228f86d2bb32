use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};

use courier_core::RelayPlan;

use crate::dispatch::{DispatchStats, UnixSocketCourier};
use crate::error::{io_err, RelayError};
use crate::interval::run_interval;
use crate::watch::run_watch;

/// Final counters for each dispatcher that ran.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelaySummary {
    pub interval: Option<DispatchStats>,
    pub watch: Option<DispatchStats>,
}

struct Dispatchers {
    interval: Option<JoinHandle<DispatchStats>>,
    watch: Option<JoinHandle<Result<DispatchStats, RelayError>>>,
}

/// Build a runtime, run the relay on it and block until it exits.
pub fn start_blocking(plan: RelayPlan) -> Result<RelaySummary, RelayError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(plan))
}

/// Run the dispatchers selected by `plan` until SIGINT or SIGTERM.
///
/// Signal handlers are installed before any dispatcher starts.
pub async fn run(plan: RelayPlan) -> Result<RelaySummary, RelayError> {
    let signals = ShutdownSignals::install()?;
    let (shutdown_tx, _) = broadcast::channel::<()>(16);
    let dispatchers = spawn_dispatchers(&plan, &shutdown_tx);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let result = signal_task(signals, shutdown.clone(), shutdown_rx).await;
            let _ = shutdown.send(());
            result
        })
    };

    let summary = join_dispatchers(dispatchers).await;
    let _ = shutdown_tx.send(());
    let signal_result = signal_handle.await;

    let summary = summary?;
    handle_join("signal_handler", signal_result)?;
    Ok(summary)
}

/// Run the dispatchers until something is sent on `shutdown_tx`.
///
/// No signal handlers are installed; the caller owns shutdown.
pub async fn run_with_shutdown(
    plan: RelayPlan,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<RelaySummary, RelayError> {
    join_dispatchers(spawn_dispatchers(&plan, &shutdown_tx)).await
}

fn spawn_dispatchers(plan: &RelayPlan, shutdown_tx: &broadcast::Sender<()>) -> Dispatchers {
    let courier = UnixSocketCourier::new(plan.socket.clone());
    tracing::info!(socket = %plan.socket, modes = ?plan.modes(), "starting relay");
    if plan.skipped_interval {
        tracing::warn!("no message file configured; interval sender not started");
    }

    let interval = plan.interval.clone().map(|interval_plan| {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let courier = courier.clone();
        tokio::spawn(async move {
            let stats = run_interval(&courier, &interval_plan, shutdown_rx).await;
            let _ = shutdown.send(());
            stats
        })
    });

    let watch = plan.watch.clone().map(|watch_plan| {
        let shutdown = shutdown_tx.clone();
        let shutdown_rx = shutdown.subscribe();
        let courier = courier.clone();
        tokio::spawn(async move {
            let result = run_watch(&courier, &watch_plan, shutdown_rx).await;
            if let Err(err) = &result {
                tracing::error!(error = %err, "watch sender failed");
            }
            let _ = shutdown.send(());
            result
        })
    });

    Dispatchers { interval, watch }
}

async fn join_dispatchers(dispatchers: Dispatchers) -> Result<RelaySummary, RelayError> {
    let mut summary = RelaySummary::default();
    if let Some(handle) = dispatchers.interval {
        summary.interval = Some(handle.await.map_err(|err| join_err("interval", err))?);
    }
    if let Some(handle) = dispatchers.watch {
        summary.watch = Some(handle.await.map_err(|err| join_err("watch", err))??);
    }
    Ok(summary)
}

/// SIGINT and SIGTERM streams. Signals arriving after `install` are kept
/// until the streams are polled.
struct ShutdownSignals {
    interrupt: Signal,
    terminate: Signal,
}

impl ShutdownSignals {
    fn install() -> Result<Self, RelayError> {
        let interrupt = signal(SignalKind::interrupt())
            .map_err(|err| RelayError::Signal(format!("SIGINT handler failed: {err}")))?;
        let terminate = signal(SignalKind::terminate())
            .map_err(|err| RelayError::Signal(format!("SIGTERM handler failed: {err}")))?;
        Ok(Self {
            interrupt,
            terminate,
        })
    }
}

async fn signal_task(
    mut signals: ShutdownSignals,
    shutdown: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), RelayError> {
    tokio::select! {
        _ = shutdown_rx.recv() => Ok(()),
        _ = signals.interrupt.recv() => {
            tracing::info!("received signal to quit");
            let _ = shutdown.send(());
            Ok(())
        }
        _ = signals.terminate.recv() => {
            tracing::info!("received SIGTERM, shutting down");
            let _ = shutdown.send(());
            Ok(())
        }
    }
}

fn join_err(task: &'static str, err: JoinError) -> RelayError {
    RelayError::TaskJoin {
        task,
        message: err.to_string(),
    }
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), RelayError>, JoinError>,
) -> Result<(), RelayError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(join_err(task, err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use courier_core::{SocketPath, WatchPlan};
    use tempfile::TempDir;

    #[tokio::test]
    async fn failed_subscription_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let plan = RelayPlan {
            socket: SocketPath(dir.path().join("s.sock")),
            interval: None,
            watch: Some(WatchPlan {
                dir: dir.path().join("missing"),
                settle: Duration::ZERO,
            }),
            skipped_interval: false,
        };
        let (shutdown, _) = broadcast::channel(4);

        let err = run_with_shutdown(plan, shutdown).await.unwrap_err();

        assert!(matches!(err, RelayError::Subscribe { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn failed_subscription_stops_interval_sender_too() {
        let dir = TempDir::new().expect("tempdir");
        let plan = RelayPlan {
            socket: SocketPath(dir.path().join("s.sock")),
            interval: Some(courier_core::IntervalPlan {
                message: PathBuf::from("/tmp/never-sent.txt"),
                period: Duration::from_secs(3600),
            }),
            watch: Some(WatchPlan {
                dir: dir.path().join("missing"),
                settle: Duration::ZERO,
            }),
            skipped_interval: false,
        };
        let (shutdown, _) = broadcast::channel(4);

        let result = tokio::time::timeout(Duration::from_secs(5), run_with_shutdown(plan, shutdown))
            .await
            .expect("relay must stop once the watch sender fails");

        assert!(matches!(result, Err(RelayError::Subscribe { .. })));
    }

    #[tokio::test]
    async fn interrupt_before_signal_task_runs_is_not_lost() {
        let signals = ShutdownSignals::install().expect("install handlers");
        let status = std::process::Command::new("kill")
            .args(["-INT", &std::process::id().to_string()])
            .status()
            .expect("run kill");
        assert!(status.success());

        let (shutdown, _) = broadcast::channel(4);
        let mut observer = shutdown.subscribe();
        let shutdown_rx = shutdown.subscribe();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            signal_task(signals, shutdown.clone(), shutdown_rx),
        )
        .await
        .expect("pending SIGINT must end the signal task");

        assert!(result.is_ok());
        assert!(observer.try_recv().is_ok(), "shutdown must be broadcast");
    }

    #[test]
    fn join_failure_names_the_task() {
        let err = RelayError::TaskJoin {
            task: "watch",
            message: "task panicked".to_string(),
        };
        assert_eq!(err.to_string(), "watch task join failure: task panicked");
    }
}
