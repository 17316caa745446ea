use std::sync::Arc;
use std::time::Duration;

use itertools::Itertools;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::model::MatchRecord;
use crate::scraper::dedupe::dedupe;
use crate::scraper::{listing, Fetcher};

pub(crate) const LISTING_PATH: &str = "/matches";

/// A deduplicated listing and the moment it was fetched.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<MatchRecord>,
    pub fetched_at: Instant,
}

impl Snapshot {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// Fresh while strictly younger than `window`.
    pub fn is_fresh(&self, window: Duration) -> bool {
        self.age() < window
    }

    fn filtered(&self, min_importance: u8) -> Vec<MatchRecord> {
        self.records
            .iter()
            .filter(|r| r.importance >= min_importance)
            .cloned()
            .collect_vec()
    }
}

/// Holds the latest upcoming-matches snapshot and refreshes it on demand.
///
/// Readers get either the old or the new snapshot: refreshes build a new
/// [`Snapshot`] and swap the pointer under the write lock.
pub struct MatchCache {
    fetcher: Arc<Fetcher>,
    freshness_window: Duration,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    refresh_lock: Mutex<()>,
}

impl MatchCache {
    pub(crate) fn new(fetcher: Arc<Fetcher>, freshness_window: Duration) -> Self {
        Self {
            fetcher,
            freshness_window,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// The current snapshot, fresh or not.
    pub async fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    async fn fresh_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot()
            .await
            .filter(|s| s.is_fresh(self.freshness_window))
    }

    /// Matches with `importance >= min_importance`.
    ///
    /// With `allow_cached`, a fresh snapshot is served without network
    /// access. Otherwise, or when the snapshot is stale, the listing is
    /// fetched, deduplicated and swapped in. On error the previous snapshot
    /// is left untouched.
    #[instrument(skip(self))]
    pub async fn get_matches(
        &self,
        min_importance: u8,
        allow_cached: bool,
    ) -> Result<Vec<MatchRecord>> {
        if allow_cached {
            if let Some(snapshot) = self.fresh_snapshot().await {
                debug!(age = ?snapshot.age(), "serving cached matches");
                return Ok(snapshot.filtered(min_importance));
            }
        }

        let _refreshing = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited for the lock.
        if allow_cached {
            if let Some(snapshot) = self.fresh_snapshot().await {
                return Ok(snapshot.filtered(min_importance));
            }
        }

        let snapshot = self.refresh().await?;
        Ok(snapshot.filtered(min_importance))
    }

    async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let url = self.fetcher.url(LISTING_PATH);
        let records = dedupe(listing::fetch_listing(&self.fetcher, &url).await?);
        let snapshot = Arc::new(Snapshot {
            records,
            fetched_at: Instant::now(),
        });
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        info!(count = snapshot.records.len(), "match cache refreshed");
        Ok(snapshot)
    }
}
