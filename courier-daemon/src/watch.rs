//! Watch sender: forward every file created in a directory.
//!
//! The notify backend runs its own thread and pushes raw events into an
//! unbounded channel; [`consume_events`] drains that channel one event at a
//! time, so a backlog waits in the channel rather than in parallel transfers.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::fs;
use tokio::sync::{broadcast, mpsc};

use courier_core::WatchPlan;

use crate::dispatch::{attempt, Deliver, DispatchStats};
use crate::error::RelayError;

pub type EventReceiver = mpsc::UnboundedReceiver<notify::Result<Event>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    /// A file renamed into the folder from elsewhere.
    MovedIn,
    Other,
}

impl WatchEventKind {
    fn delivers(self) -> bool {
        matches!(self, WatchEventKind::Create | WatchEventKind::MovedIn)
    }
}

/// One path from a filesystem notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    /// Split a notify event into one entry per path. Folder creation is
    /// reported as [`WatchEventKind::Other`].
    ///
    /// Renames count only on their destination side: `RenameMode::To`
    /// paths and the second path of a `RenameMode::Both` pair become
    /// [`WatchEventKind::MovedIn`]; the source side is dropped.
    pub fn from_notify(event: Event) -> Vec<WatchEvent> {
        let kind = match event.kind {
            EventKind::Create(CreateKind::Folder) => WatchEventKind::Other,
            EventKind::Create(_) => WatchEventKind::Create,
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) => WatchEventKind::MovedIn,
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
                return event
                    .paths
                    .into_iter()
                    .skip(1)
                    .take(1)
                    .map(|path| WatchEvent {
                        kind: WatchEventKind::MovedIn,
                        path,
                    })
                    .collect();
            }
            _ => WatchEventKind::Other,
        };
        event
            .paths
            .into_iter()
            .map(|path| WatchEvent { kind, path })
            .collect()
    }

    /// `dir` joined with the base name of the reported path.
    pub fn target_in(&self, dir: &Path) -> Option<PathBuf> {
        self.path.file_name().map(|name| dir.join(name))
    }
}

/// A live directory subscription. Dropping it stops the notify backend.
pub struct Subscription {
    _watcher: RecommendedWatcher,
    events: EventReceiver,
}

impl Subscription {
    pub fn events(&mut self) -> &mut EventReceiver {
        &mut self.events
    }
}

/// Register a non-recursive watch on `dir`.
///
/// # Errors
/// [`RelayError::Subscribe`] when the backend cannot be created or the
/// directory cannot be watched.
pub fn subscribe(dir: &Path) -> Result<Subscription, RelayError> {
    let subscribe_err = |source| RelayError::Subscribe {
        dir: dir.to_path_buf(),
        source,
    };

    let (event_tx, events) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })
    .map_err(subscribe_err)?;
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(subscribe_err)?;
    tracing::debug!(path = %dir.display(), "watching message directory");

    Ok(Subscription {
        _watcher: watcher,
        events,
    })
}

/// Subscribe to `plan.dir` and forward created files until shutdown.
///
/// # Errors
/// Only subscription failure is returned; per-event problems are logged.
pub async fn run_watch<C: Deliver>(
    courier: &C,
    plan: &WatchPlan,
    shutdown_rx: broadcast::Receiver<()>,
) -> Result<DispatchStats, RelayError> {
    let mut subscription = subscribe(&plan.dir)?;
    tracing::info!(path = %plan.dir.display(), "watch sender started");

    let stats = consume_events(courier, plan, subscription.events(), shutdown_rx).await;

    tracing::info!(
        attempted = stats.attempted,
        delivered = stats.delivered,
        failed = stats.failed,
        "watch sender stopped",
    );
    Ok(stats)
}

/// Drain `events`, delivering each created file before looking at the next.
///
/// Shutdown is only observed between events.
pub async fn consume_events<C: Deliver>(
    courier: &C,
    plan: &WatchPlan,
    events: &mut EventReceiver,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::info!("received signal to quit watch sender");
                break;
            }
            event = events.recv() => {
                let Some(event) = event else {
                    tracing::warn!("watch event channel closed");
                    break;
                };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(error = %err, "watcher event error");
                        continue;
                    }
                };

                for watch_event in WatchEvent::from_notify(event) {
                    if !watch_event.kind.delivers() {
                        continue;
                    }
                    let Some(target) = watch_event.target_in(&plan.dir) else {
                        tracing::debug!(path = %watch_event.path.display(), "event path has no file name");
                        continue;
                    };
                    if is_dir(&target).await {
                        tracing::debug!(path = %target.display(), "ignoring created directory");
                        continue;
                    }
                    if watch_event.kind == WatchEventKind::MovedIn {
                        if !lies_in(&plan.dir, &watch_event.path).await {
                            tracing::debug!(path = %watch_event.path.display(), "ignoring rename out of watch folder");
                            continue;
                        }
                        // inotify reports one move as both `To` and `Both`.
                        if !fs::try_exists(&target).await.unwrap_or(false) {
                            tracing::debug!(path = %target.display(), "moved-in file already gone");
                            continue;
                        }
                    }

                    tracing::info!(path = %target.display(), "created file");
                    if !plan.settle.is_zero() {
                        tokio::time::sleep(plan.settle).await;
                    }
                    attempt(courier, &target, "watch", &mut stats).await;
                }
            }
        }
    }

    stats
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Whether `path` sits directly in `dir`, allowing for one side being
/// canonicalized by the backend.
async fn lies_in(dir: &Path, path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    if parent == dir {
        return true;
    }
    match (fs::canonicalize(parent).await, fs::canonicalize(dir).await) {
        (Ok(parent), Ok(dir)) => parent == dir,
        _ => false,
    }
}
