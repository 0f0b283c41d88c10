//! Expiry Janitor Task
//!
//! Background task that periodically evicts entries idle for longer than the
//! cache expiry.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::WeakObjectCache;

/// Shortest sweep period, for very small expiry values
const MIN_SWEEP_PERIOD: Duration = Duration::from_millis(1);

/// Sweep cadence for a given expiry.
///
/// Sweeping every quarter of the expiry evicts an idle entry within
/// `[expiry, 1.25 * expiry]` of its last access.
pub fn sweep_period(expiry: Duration) -> Duration {
    (expiry / 4).max(MIN_SWEEP_PERIOD)
}

// == Janitor ==
/// Handle to a running janitor task.
///
/// Dropping the handle without calling [`Janitor::stop`] closes the stop
/// channel, which also ends the task.
#[derive(Debug)]
pub(crate) struct Janitor {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Janitor {
    /// Spawns the sweep loop on `runtime`.
    ///
    /// The task holds only a weak reference to the cache and exits on its
    /// own once the cache is dropped.
    pub(crate) fn spawn(runtime: &Handle, cache: WeakObjectCache, expiry: Duration) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = sweep_period(expiry);

        let handle = runtime.spawn(async move {
            info!(
                "Starting expiry janitor: expiry={:?}, sweep every {:?}",
                expiry, period
            );

            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // A sent signal and a dropped sender both end the task
                    _ = &mut stop_rx => {
                        info!("Expiry janitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(cache) = cache.upgrade() else {
                            debug!("Cache dropped, expiry janitor exiting");
                            break;
                        };

                        let evicted = cache.sweep_expired().await;
                        if evicted.is_empty() {
                            debug!("Expiry sweep: no idle entries found");
                        } else {
                            info!("Expiry sweep: evicted {} idle entries", evicted.len());
                        }
                    }
                }
            }
        });

        Self { stop_tx, handle }
    }

    /// Signals the task to stop and waits for it to finish.
    pub(crate) async fn stop(self) {
        // The task may already be gone if the cache was dropped
        let _ = self.stop_tx.send(());

        if let Err(e) = self.handle.await {
            warn!("Expiry janitor ended abnormally: {}", e);
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
