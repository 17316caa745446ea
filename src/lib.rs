pub use cache::{MatchCache, Snapshot};
pub use client::HltvClient;
pub use config::ScraperConfig;
pub use error::{HltvError, Result};
pub use model::*;
pub use refresh::{run_cycle, CycleReport, RefreshDriver};
pub use scraper::datetime::DateTimeResolver;
pub use scraper::dedupe::{dedupe, dedupe_by_fields};
pub use scraper::rate_limit::RateLimiter;
pub use scraper::{HttpSource, PageSource};

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod refresh;
pub(crate) mod scraper;

#[cfg(test)]
pub(crate) mod testing;
