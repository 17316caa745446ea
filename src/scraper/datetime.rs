use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ::scraper::{ElementRef, Selector};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::error::Result;
use crate::model::MatchRecord;
use crate::scraper::{self, Fetcher};

/// Lazily resolves match start times from individual match pages.
///
/// The listing page does not carry a usable timestamp, so each match page
/// is fetched once and the outcome (including "no timestamp") is memoized
/// by detail path for the lifetime of the resolver. The table is never
/// evicted.
pub struct DateTimeResolver {
    fetcher: Arc<Fetcher>,
    resolved: Mutex<HashMap<String, Option<DateTime<Utc>>>>,
}

impl DateTimeResolver {
    pub(crate) fn new(fetcher: Arc<Fetcher>) -> Self {
        Self {
            fetcher,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// The memoized outcome for `detail_path`, without touching the network.
    /// `None` means the path was never resolved.
    pub async fn cached(&self, detail_path: &str) -> Option<Option<DateTime<Utc>>> {
        self.resolved.lock().await.get(detail_path).copied()
    }

    /// Number of memoized paths.
    pub async fn len(&self) -> usize {
        self.resolved.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Start time for the match at `detail_path`.
    ///
    /// Only the first call per path fetches; later calls return the stored
    /// outcome. Fetch failures are stored as `None` like pages without a
    /// timestamp.
    #[instrument(skip(self))]
    pub async fn resolve(&self, detail_path: &str) -> Option<DateTime<Utc>> {
        if let Some(hit) = self.cached(detail_path).await {
            return hit;
        }

        let url = self.fetcher.url(detail_path);
        let outcome = match self.fetch_timestamp(&url).await {
            Ok(Some(time)) => Some(time),
            Ok(None) => {
                debug!(url, "match page has no timestamp");
                None
            }
            Err(e) => {
                warn!(error = %e, url, "failed to resolve match time");
                None
            }
        };

        // A concurrent resolve may have stored first; keep its value.
        *self
            .resolved
            .lock()
            .await
            .entry(detail_path.to_string())
            .or_insert(outcome)
    }

    async fn fetch_timestamp(&self, url: &str) -> Result<Option<DateTime<Utc>>> {
        let document = self.fetcher.get_document(url).await?;
        parse_timestamp(&document)
    }

    /// Resolve up to `max_count` records that have a detail path and no
    /// memoized outcome yet, in input order. Returns how many were fetched.
    pub async fn preload(&self, records: &[MatchRecord], max_count: usize) -> usize {
        let mut fetched = 0;
        for path in records.iter().filter_map(|r| r.detail_path.as_deref()) {
            if fetched >= max_count {
                break;
            }
            if self.cached(path).await.is_some() {
                continue;
            }
            self.resolve(path).await;
            fetched += 1;
        }
        debug!(fetched, max_count, "preloaded match times");
        fetched
    }

    /// Fill in start times that are already memoized. Never fetches.
    pub async fn apply_cached(&self, records: Vec<MatchRecord>) -> Vec<MatchRecord> {
        let resolved = self.resolved.lock().await;
        records
            .into_iter()
            .map(|record| {
                let time = record
                    .detail_path
                    .as_deref()
                    .and_then(|path| resolved.get(path).copied().flatten());
                record.with_scheduled_time(time)
            })
            .collect()
    }
}

/// Find the epoch-millisecond `data-unix` timestamp on a match page: the
/// first one in the document, else one inside a `.time` element.
pub(crate) fn parse_timestamp(document: &scraper::Html) -> Result<Option<DateTime<Utc>>> {
    let any_selector = Selector::parse("[data-unix]")?;
    let time_selector = Selector::parse(".time[data-unix], .time [data-unix]")?;

    let first = document.select(&any_selector).next().and_then(unix_millis);
    Ok(first.or_else(|| document.select(&time_selector).find_map(unix_millis)))
}

fn unix_millis(element: ElementRef) -> Option<DateTime<Utc>> {
    let millis = element.value().attr("data-unix")?.trim().parse::<i64>().ok()?;
    DateTime::from_timestamp_millis(millis)
}
