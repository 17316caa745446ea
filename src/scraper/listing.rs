use itertools::Itertools;
use ::scraper::{CaseSensitivity, ElementRef, Selector};
use tracing::{debug, trace, warn};

use crate::error::{HltvError, Result};
use crate::model::{MatchRecord, UNKNOWN_EVENT};
use crate::scraper::{self, count_stars, element_text, match_id_from_path, Fetcher};

const MATCH_BLOCK_SELECTOR: &str = "div.match-wrapper, div.upcomingMatch";
const LIVE_CLASS: &str = "live";

/// Fetch a listing page and extract its match blocks, duplicates included.
pub(crate) async fn fetch_listing(fetcher: &Fetcher, url: &str) -> Result<Vec<MatchRecord>> {
    let document = fetcher.get_document(url).await?;
    parse_listing(&document)
}

/// Turn the upcoming-matches page into records, one per match block.
///
/// Blocks without two team names (ads, headers, placeholders) are dropped;
/// blocks that fail to parse are logged and skipped.
pub(crate) fn parse_listing(document: &scraper::Html) -> Result<Vec<MatchRecord>> {
    let selector = Selector::parse(MATCH_BLOCK_SELECTOR)?;
    let mut records = vec![];
    for element in document.select(&selector) {
        match parse_match_block(&element) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => trace!("skipping block without two teams"),
            Err(e) => warn!(error = %e, "skipping unparsable match block"),
        }
    }
    debug!(count = records.len(), "parsed match listing");
    Ok(records)
}

fn parse_match_block(element: &ElementRef) -> Result<Option<MatchRecord>> {
    let names_selector = Selector::parse(".match-teamname, .matchTeamName")?;
    let names = element
        .select(&names_selector)
        .map(|e| element_text(&e))
        .collect_vec();
    let (team_a, team_b) = match names.as_slice() {
        [a, b, ..] if !a.is_empty() && !b.is_empty() => (a.clone(), b.clone()),
        _ => return Ok(None),
    };

    let link_selector = Selector::parse("a[href^='/matches/']")?;
    let detail_path = element
        .select(&link_selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string());

    let identity = element
        .value()
        .attr("data-match-id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .or_else(|| detail_path.as_deref().and_then(match_id_from_path))
        .ok_or(HltvError::ElementNotFound {
            context: "match block id (data-match-id or /matches/ link)",
        })?;

    let star_selector = Selector::parse("i.fa-star")?;
    let importance = count_stars(element, &star_selector);

    let rating_selector = Selector::parse(".match-rating")?;
    let live = element
        .select(&rating_selector)
        .any(|r| r.value().has_class(LIVE_CLASS, CaseSensitivity::CaseSensitive));

    let competition = competition_from_path(detail_path.as_deref(), &team_a, &team_b);

    Ok(Some(MatchRecord {
        identity,
        participants: [team_a, team_b],
        competition,
        scheduled_time: None,
        importance,
        outcome: None,
        detail_path,
        live,
    }))
}

/// Derive the event name from a match page path.
///
/// `/matches/123/faze-vs-navi-blast-premier-2025` with teams `FaZe` and
/// `Navi` (in either order) gives `Blast Premier 2025`.
pub(crate) fn competition_from_path(path: Option<&str>, team_a: &str, team_b: &str) -> String {
    let Some(slug) = path.and_then(|p| p.trim_end_matches('/').rsplit('/').next()) else {
        return UNKNOWN_EVENT.to_string();
    };
    let (a, b) = (slugify(team_a), slugify(team_b));
    let remainder = [format!("{a}-vs-{b}-"), format!("{b}-vs-{a}-")]
        .iter()
        .find_map(|prefix| slug.strip_prefix(prefix.as_str()));

    match remainder.map(title_case) {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_EVENT.to_string(),
    }
}

fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-").replace('.', "")
}

fn title_case(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .join(" ")
}
