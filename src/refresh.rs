//! Periodic cache refresh.
//!
//! Each cycle forces a listing refresh and then resolves start times for
//! the most important matches, so user-facing reads find them ready.

use std::cmp::Reverse;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

use crate::client::HltvClient;

/// What one refresh cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    pub matches: usize,
    pub preloaded: usize,
}

/// Force a cache refresh, then preload start times for matches at or above
/// the configured importance, highest importance first, up to the
/// configured cap.
#[instrument(skip(client))]
pub async fn run_cycle(client: &HltvClient) -> CycleReport {
    let config = client.config();
    let records = client.refresh_cache(true).await;
    let matches = records.len();

    let mut important: Vec<_> = records
        .into_iter()
        .filter(|r| r.importance >= config.preload_min_importance)
        .collect();
    important.sort_by_key(|r| Reverse(r.importance));

    let preloaded = client
        .preload_datetimes(&important, config.preload_max_count)
        .await;
    info!(matches, preloaded, "refresh cycle finished");
    CycleReport { matches, preloaded }
}

/// Runs [`run_cycle`] on a background task: first after the warm-up delay,
/// then every refresh interval.
///
/// A cycle in progress is never interrupted; [`RefreshDriver::shutdown`]
/// waits for it to finish.
pub struct RefreshDriver {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshDriver {
    /// Spawn the driver on the current tokio runtime.
    pub fn spawn(client: Arc<HltvClient>) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let start = Instant::now() + client.config().warmup_delay();
        // interval_at panics on a zero period.
        let period = client.config().refresh_interval().max(Duration::from_secs(1));

        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        run_cycle(&client).await;
                    }
                    _ = shutdown_rx.changed() => {
                        debug!("refresh driver stopping");
                        break;
                    }
                }
            }
        });

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signal the driver to stop and wait for it to exit.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown_tx.send(true);
        let _ = self.handle.await;
    }
}
