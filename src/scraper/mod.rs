pub(crate) mod datetime;
pub(crate) mod dedupe;
pub(crate) mod listing;
pub(crate) mod rate_limit;
pub(crate) mod results;
pub(crate) mod search;

use std::sync::Arc;

pub(crate) use ::scraper::Html;
use ::scraper::{CaseSensitivity, ElementRef, Selector};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{HltvError, Result};
use rate_limit::RateLimiter;

/// Marker class HLTV puts on the padding stars of its fixed five-star layout.
pub(crate) const FADED_STAR_CLASS: &str = "faded";

/// Something that can return the raw body of an upstream page.
///
/// [`HttpSource`] is the real implementation; tests plug in canned pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// Fetches pages from HLTV over HTTP.
pub struct HttpSource {
    http: reqwest::Client,
}

impl HttpSource {
    /// Build a client with browser-like headers and the configured timeout.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        let referer = HeaderValue::from_str(&format!("{}/", config.base_url()))
            .map_err(|e| HltvError::Config(format!("base_url is not a valid header: {e}")))?;
        headers.insert(REFERER, referer);

        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| HltvError::Http {
                url: config.base_url().to_owned(),
                source: e,
            })?;
        Ok(Self { http })
    }

    /// Use a preconfigured [`reqwest::Client`] (proxies, custom TLS, ...).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { http: client }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await.map_err(|e| HltvError::Http {
            url: url.to_owned(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HltvError::UnexpectedStatus {
                url: url.to_owned(),
                status,
            });
        }

        response.text().await.map_err(|e| HltvError::ResponseBody {
            url: url.to_owned(),
            source: e,
        })
    }
}

/// The single gateway to the upstream site: every request waits on the
/// shared [`RateLimiter`] first.
pub(crate) struct Fetcher {
    source: Arc<dyn PageSource>,
    limiter: RateLimiter,
    base_url: String,
}

impl Fetcher {
    pub(crate) fn new(source: Arc<dyn PageSource>, config: &ScraperConfig) -> Self {
        Self {
            source,
            limiter: RateLimiter::new(config.request_interval()),
            base_url: config.base_url().to_owned(),
        }
    }

    /// Absolute URL for a site-relative path.
    pub(crate) fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_owned()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Fetch a URL (one round trip, no retry) and parse it as an HTML document.
    pub(crate) async fn get_document(&self, url: &str) -> Result<Html> {
        self.limiter.acquire().await;
        debug!(url, "fetching page");
        let body = self.source.fetch_page(url).await?;
        Ok(Html::parse_document(&body))
    }
}

/// Extract trimmed text content from the first element matching `selector`
/// inside `element`. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default()
}

/// All text of `element`, whitespace-collapsed.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Number of star markers in `element` that are not faded padding.
pub(crate) fn count_stars(element: &ElementRef, star_selector: &Selector) -> u8 {
    let stars = element
        .select(star_selector)
        .filter(|star| {
            !star
                .value()
                .has_class(FADED_STAR_CLASS, CaseSensitivity::CaseSensitive)
        })
        .count();
    stars.min(u8::MAX as usize) as u8
}

/// The numeric id in `/matches/<id>/<slug>`.
pub(crate) fn match_id_from_path(path: &str) -> Option<String> {
    let mut segments = path.trim_start_matches('/').split('/');
    if segments.next()? != "matches" {
        return None;
    }
    let id = segments.next()?;
    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    #[test]
    fn test_match_id_from_path() {
        assert_eq!(
            match_id_from_path("/matches/2370001/faze-vs-navi-blast-premier-2025").as_deref(),
            Some("2370001")
        );
        assert_eq!(match_id_from_path("/matches/abc/faze-vs-navi"), None);
        assert_eq!(match_id_from_path("/team/4494/mouz"), None);
        assert_eq!(match_id_from_path(""), None);
    }

    #[test]
    fn test_count_stars_ignores_faded() {
        let html = Html::parse_fragment(
            r#"<div class="stars">
                <i class="fa fa-star"></i>
                <i class="fa fa-star"></i>
                <i class="fa fa-star faded"></i>
            </div>"#,
        );
        let root = html.root_element();
        let selector = Selector::parse("i.fa-star").unwrap();
        assert_eq!(count_stars(&root, &selector), 2);
    }

    #[test]
    fn test_fetcher_url() {
        let config = ScraperConfig {
            base_url: "https://www.hltv.org/".to_string(),
            ..Default::default()
        };
        let fetcher = Fetcher::new(Arc::new(FakeSource::new()), &config);
        assert_eq!(fetcher.url("/matches"), "https://www.hltv.org/matches");
        assert_eq!(fetcher.url("results"), "https://www.hltv.org/results");
        assert_eq!(fetcher.url("https://example.com/x"), "https://example.com/x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_document_surfaces_fetch_errors() {
        let source = Arc::new(FakeSource::new().failing("https://www.hltv.org/matches"));
        let fetcher = Fetcher::new(source.clone(), &ScraperConfig::default());

        let err = fetcher
            .get_document("https://www.hltv.org/matches")
            .await
            .unwrap_err();
        assert!(err.is_fetch_error());

        let err = fetcher
            .get_document("https://www.hltv.org/unknown")
            .await
            .unwrap_err();
        assert!(err.is_fetch_error());
        assert_eq!(source.hits(), 2);
    }
}
