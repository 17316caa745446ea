use itertools::Itertools;
use ::scraper::Selector;
use tracing::debug;

use crate::error::{HltvError, Result};
use crate::scraper::{self, element_text, Fetcher};

/// Search page URL for `term`, with the term percent-encoded.
pub(crate) fn search_url(fetcher: &Fetcher, term: &str) -> Result<String> {
    let base = fetcher.url("/search");
    reqwest::Url::parse_with_params(&base, &[("term", term.trim())])
        .map(String::from)
        .map_err(|e| HltvError::Url {
            url: base,
            reason: e.to_string(),
        })
}

/// Fetch the search page for `term` and return the team names it lists.
pub(crate) async fn search_teams(fetcher: &Fetcher, term: &str) -> Result<Vec<String>> {
    let url = search_url(fetcher, term)?;
    let document = fetcher.get_document(&url).await?;
    parse_team_names(&document)
}

/// Names of all `/team/<id>/<slug>` links on a search page.
pub(crate) fn parse_team_names(document: &scraper::Html) -> Result<Vec<String>> {
    let selector = Selector::parse("a[href^='/team/']")?;
    let names = document
        .select(&selector)
        .filter(|a| a.value().attr("href").is_some_and(is_team_path))
        .map(|a| element_text(&a))
        .filter(|name| !name.is_empty())
        .unique()
        .collect_vec();
    debug!(count = names.len(), "parsed team search results");
    Ok(names)
}

fn is_team_path(href: &str) -> bool {
    href.strip_prefix("/team/")
        .and_then(|rest| rest.split('/').next())
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
}

/// Loose, case-insensitive match in either direction, so `navi` accepts
/// `Natus Vincere (NaVi)` and `Team Vitality` accepts `Vitality`.
pub(crate) fn matches_team(candidates: &[String], term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    candidates.iter().any(|candidate| {
        let candidate = candidate.to_lowercase();
        candidate.contains(&term) || term.contains(&candidate)
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::ScraperConfig;
    use crate::scraper::Html;
    use crate::testing::FakeSource;

    pub(crate) fn search_page(teams: &[(&str, &str)]) -> String {
        let rows = teams
            .iter()
            .map(|(id, name)| format!(r#"<tr><td><a href="/team/{id}/{}">{name}</a></td></tr>"#, name.to_lowercase()))
            .join("");
        format!(
            r#"<html><body><table class="table"><tbody>{rows}</tbody></table>
               <a href="/team/ranking">Ranking</a>
               <a href="/player/7998/s1mple">s1mple</a></body></html>"#
        )
    }

    #[test]
    fn test_parse_team_names() {
        let page = search_page(&[("4608", "Natus Vincere"), ("6667", "FaZe")]);
        let names = parse_team_names(&Html::parse_document(&page)).unwrap();
        assert_eq!(names, ["Natus Vincere", "FaZe"]);
    }

    #[test]
    fn test_matches_team() {
        let candidates = vec!["Natus Vincere".to_string(), "Vitality".to_string()];
        assert!(matches_team(&candidates, "vincere"));
        assert!(matches_team(&candidates, "Team Vitality"));
        assert!(!matches_team(&candidates, "G2"));
        assert!(!matches_team(&candidates, "  "));
    }

    #[test]
    fn test_search_url_encodes_term() {
        let fetcher = Fetcher::new(Arc::new(FakeSource::new()), &ScraperConfig::default());
        assert_eq!(
            search_url(&fetcher, " Team Liquid ").unwrap(),
            "https://www.hltv.org/search?term=Team+Liquid"
        );
    }
}
