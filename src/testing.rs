//! Canned upstream pages for offline tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{HltvError, Result};
use crate::scraper::PageSource;

#[derive(Default)]
pub(crate) struct FakeSource {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    queued: Mutex<HashMap<String, VecDeque<String>>>,
    requests: Mutex<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Serve `bodies` for `url` one per request, then fall back to `page`.
    pub(crate) fn pages_in_turn(self, url: &str, bodies: &[String]) -> Self {
        self.queued
            .lock()
            .unwrap()
            .insert(url.to_string(), bodies.iter().cloned().collect());
        self
    }

    pub(crate) fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub(crate) fn hits(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn hits_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }
}

#[async_trait]
impl PageSource for FakeSource {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.failing.contains(url) {
            return Err(HltvError::UnexpectedStatus {
                url: url.to_string(),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        let next = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);
        if let Some(body) = next {
            return Ok(body);
        }
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| HltvError::UnexpectedStatus {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
    }
}
