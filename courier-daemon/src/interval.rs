//! Interval sender: resend one message file on a fixed period.

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use courier_core::IntervalPlan;

use crate::dispatch::{attempt, Deliver, DispatchStats};

/// Deliver `plan.message` once per `plan.period` until shutdown.
///
/// The first attempt happens one full period after start. Attempts run
/// inline, so a slow one pushes the next tick back instead of overlapping
/// it, and consecutive attempts always start at least one period apart.
/// Shutdown is only observed between attempts.
pub async fn run_interval<C: Deliver>(
    courier: &C,
    plan: &IntervalPlan,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();
    if plan.period.is_zero() {
        tracing::warn!(path = %plan.message.display(), "interval is zero; interval sender not started");
        return stats;
    }

    let mut ticker = tokio::time::interval(plan.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // the first tick completes immediately

    tracing::info!(
        path = %plan.message.display(),
        period_secs = plan.period.as_secs_f64(),
        "interval sender started",
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => {
                tracing::info!("received signal to quit interval sender");
                break;
            }
            _ = ticker.tick() => {
                attempt(courier, &plan.message, "interval", &mut stats).await;
            }
        }
    }

    tracing::info!(
        attempted = stats.attempted,
        delivered = stats.delivered,
        failed = stats.failed,
        "interval sender stopped",
    );
    stats
}
