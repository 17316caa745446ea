use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use crate::cache::{MatchCache, LISTING_PATH};
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::model::MatchRecord;
use crate::scraper::datetime::DateTimeResolver;
use crate::scraper::dedupe::dedupe_by_fields;
use crate::scraper::search::{matches_team, search_teams};
use crate::scraper::{listing, results, Fetcher, HttpSource, PageSource};

const RESULTS_PATH: &str = "/results";

/// The main entry point for reading HLTV match data.
///
/// `HltvClient` owns the shared rate limiter, the match cache and the
/// start-time resolver, so every request it makes is spaced by the
/// configured interval. Wrap it in an [`Arc`] to share it between tasks.
///
/// Read operations never fail: upstream errors are logged and surface as an
/// empty result.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> hltv_scraper::Result<()> {
/// use hltv_scraper::HltvClient;
///
/// let client = HltvClient::new()?;
/// let matches = client.get_matches(1, true).await;
/// println!("Found {} important matches", matches.len());
/// # Ok(())
/// # }
/// ```
pub struct HltvClient {
    config: ScraperConfig,
    fetcher: Arc<Fetcher>,
    cache: MatchCache,
    resolver: DateTimeResolver,
    known_teams: Mutex<BTreeSet<String>>,
}

impl HltvClient {
    /// Create a new client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_config(ScraperConfig::default())
    }

    /// Create a client that talks to HLTV over HTTP with the given settings.
    pub fn with_config(config: ScraperConfig) -> Result<Self> {
        config.validate()?;
        let source = HttpSource::new(&config)?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create a client on top of any [`PageSource`].
    pub fn with_source(config: ScraperConfig, source: Arc<dyn PageSource>) -> Self {
        let fetcher = Arc::new(Fetcher::new(source, &config));
        Self {
            cache: MatchCache::new(Arc::clone(&fetcher), config.freshness_window()),
            resolver: DateTimeResolver::new(Arc::clone(&fetcher)),
            fetcher,
            config,
            known_teams: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn cache(&self) -> &MatchCache {
        &self.cache
    }

    pub fn resolver(&self) -> &DateTimeResolver {
        &self.resolver
    }

    /// Upcoming matches with at least `min_importance` stars.
    ///
    /// Start times that have already been resolved are filled in; nothing
    /// is resolved on this path.
    #[instrument(skip(self))]
    pub async fn get_matches(&self, min_importance: u8, allow_cached: bool) -> Vec<MatchRecord> {
        match self.cache.get_matches(min_importance, allow_cached).await {
            Ok(records) => self.resolver.apply_cached(records).await,
            Err(e) => {
                error!(error = %e, "failed to fetch matches");
                vec![]
            }
        }
    }

    /// Recently finished matches, newest first.
    ///
    /// `window` is recorded in the trace span, not applied: the results feed
    /// cannot be filtered by time, so the head of the feed is returned.
    #[instrument(skip(self))]
    pub async fn get_recent_results(&self, window: Duration) -> Vec<MatchRecord> {
        let url = self.fetcher.url(RESULTS_PATH);
        match results::fetch_results(&self.fetcher, &url, self.config.results_limit).await {
            Ok(records) => {
                debug!(count = records.len(), "fetched recent results");
                records
            }
            Err(e) => {
                error!(error = %e, "failed to fetch results");
                vec![]
            }
        }
    }

    /// Upcoming matches listed for one day. Not cached.
    #[instrument(skip(self))]
    pub async fn get_matches_on(&self, date: NaiveDate) -> Vec<MatchRecord> {
        let url = self.fetcher.url(&format!(
            "{LISTING_PATH}?selectedDate={}",
            date.format("%Y-%m-%d")
        ));
        match listing::fetch_listing(&self.fetcher, &url).await {
            Ok(records) => dedupe_by_fields(self.resolver.apply_cached(records).await),
            Err(e) => {
                error!(error = %e, %date, "failed to fetch matches for date");
                vec![]
            }
        }
    }

    /// Whether HLTV knows a team called `name`.
    ///
    /// Fails open: if the search page cannot be fetched the name is
    /// accepted, so an upstream outage never blocks following a team. A
    /// blank name is rejected without a request.
    #[instrument(skip(self))]
    pub async fn search_team(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            debug!("blank team name, not searching");
            return false;
        }

        let candidates = match search_teams(&self.fetcher, name).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_fetch_error() => {
                warn!(error = %e, "team search unavailable, accepting");
                return true;
            }
            Err(e) => {
                error!(error = %e, "failed to read team search results");
                vec![]
            }
        };

        self.known_teams
            .lock()
            .await
            .extend(candidates.iter().map(|c| c.to_lowercase()));

        let found = matches_team(&candidates, name);
        info!(found, "searched team");
        found
    }

    /// Lowercased team names seen in successful searches.
    pub async fn known_teams(&self) -> Vec<String> {
        self.known_teams.lock().await.iter().cloned().collect()
    }

    /// Refresh the match cache, unconditionally when `forced`, otherwise
    /// only if the snapshot is stale. Returns the whole listing.
    pub async fn refresh_cache(&self, forced: bool) -> Vec<MatchRecord> {
        self.get_matches(0, !forced).await
    }

    /// Resolve start times for up to `max_count` records that are not
    /// resolved yet. Returns how many pages were fetched.
    pub async fn preload_datetimes(&self, records: &[MatchRecord], max_count: usize) -> usize {
        self.resolver.preload(records, max_count).await
    }

    /// Start time for the match page at `detail_path`, fetched at most once.
    pub async fn resolve_datetime(&self, detail_path: &str) -> Option<DateTime<Utc>> {
        self.resolver.resolve(detail_path).await
    }
}
