use itertools::Itertools;
use ::scraper::{ElementRef, Selector};
use tracing::{debug, trace, warn};

use crate::error::{HltvError, Result};
use crate::model::{MatchRecord, UNKNOWN_EVENT};
use crate::scraper::{
    self, count_stars, element_text, match_id_from_path, select_text, Fetcher,
};

const DEFAULT_SCORE: &str = "0-0";

/// Fetch the results page and extract its newest `limit` blocks.
pub(crate) async fn fetch_results(
    fetcher: &Fetcher,
    url: &str,
    limit: usize,
) -> Result<Vec<MatchRecord>> {
    let document = fetcher.get_document(url).await?;
    parse_results(&document, limit)
}

/// Turn the results page into finished records.
///
/// Only the first `limit` result blocks are looked at; the feed is newest
/// first and only its head counts as recent.
pub(crate) fn parse_results(document: &scraper::Html, limit: usize) -> Result<Vec<MatchRecord>> {
    let selector = Selector::parse("div.result-con")?;
    let mut records = vec![];
    for element in document.select(&selector).take(limit) {
        match parse_result_block(&element) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => trace!("skipping result block without two teams"),
            Err(e) => warn!(error = %e, "skipping unparsable result block"),
        }
    }
    debug!(count = records.len(), "parsed results");
    Ok(records)
}

fn parse_result_block(element: &ElementRef) -> Result<Option<MatchRecord>> {
    let link_selector = Selector::parse("a.a-reset")?;
    let identity = element
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(match_id_from_path)
        .ok_or(HltvError::ElementNotFound {
            context: "result link (a.a-reset)",
        })?;

    let team_selector = Selector::parse("div.team")?;
    let teams = element
        .select(&team_selector)
        .map(|e| element_text(&e))
        .collect_vec();
    let (team_a, team_b) = match teams.as_slice() {
        [a, b, ..] if !a.is_empty() && !b.is_empty() => (a.clone(), b.clone()),
        _ => return Ok(None),
    };

    let score_selector = Selector::parse(".result-score span")?;
    let scores = element
        .select(&score_selector)
        .map(|e| element_text(&e))
        .collect_vec();
    let outcome = match scores.as_slice() {
        [a, b, ..] => format!("{a}-{b}"),
        _ => DEFAULT_SCORE.to_string(),
    };

    let event_selector = Selector::parse(".event-name")?;
    let competition = Some(select_text(element, &event_selector))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_EVENT.to_string());

    let star_selector = Selector::parse("i.fa-star")?;
    let importance = count_stars(element, &star_selector);

    Ok(Some(MatchRecord {
        identity,
        participants: [team_a, team_b],
        competition,
        scheduled_time: None,
        importance,
        outcome: Some(outcome),
        detail_path: None,
        live: false,
    }))
}
