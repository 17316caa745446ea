use itertools::Itertools;

use crate::model::MatchRecord;

/// One record per `identity`, keeping the first occurrence and the input order.
///
/// The upcoming page repeats a match in several sections (live, featured,
/// per-day), so duplicates are expected here.
pub fn dedupe(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    records
        .into_iter()
        .unique_by(|r| r.identity.clone())
        .collect()
}

/// Like [`dedupe`], but keyed by `(identity, participants, scheduled_time)`.
///
/// Used for per-date listings, where the same id has been seen attached to
/// different pairings across dates.
pub fn dedupe_by_fields(records: Vec<MatchRecord>) -> Vec<MatchRecord> {
    records
        .into_iter()
        .unique_by(|r| (r.identity.clone(), r.participants.clone(), r.scheduled_time))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(identity: &str, competition: &str) -> MatchRecord {
        MatchRecord {
            identity: identity.to_string(),
            participants: ["FaZe".to_string(), "Navi".to_string()],
            competition: competition.to_string(),
            scheduled_time: None,
            importance: 1,
            outcome: None,
            detail_path: Some(format!("/matches/{identity}/faze-vs-navi")),
            live: false,
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let records = vec![
            record("1", "Blast Premier"),
            record("2", "Esl Pro League"),
            record("1", "Something Else"),
        ];
        let deduped = dedupe(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].identity, "1");
        assert_eq!(deduped[0].competition, "Blast Premier");
        assert_eq!(deduped[1].identity, "2");
    }

    #[test]
    fn test_first_keeps_its_fields_when_second_has_time() {
        let time = Utc.with_ymd_and_hms(2025, 3, 1, 17, 0, 0).unwrap();
        let mut with_time = record("9", "Blast Premier");
        with_time.scheduled_time = Some(time);
        let deduped = dedupe(vec![record("9", "Blast Premier"), with_time]);
        assert_eq!(deduped.len(), 1);
        assert!(deduped[0].scheduled_time.is_none());
    }

    #[test]
    fn test_dedupe_by_fields_keeps_distinct_pairings() {
        let mut other_pairing = record("1", "Blast Premier");
        other_pairing.participants = ["G2".to_string(), "MOUZ".to_string()];
        let records = vec![
            record("1", "Blast Premier"),
            other_pairing,
            record("1", "Duplicate"),
        ];
        let deduped = dedupe_by_fields(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].competition, "Blast Premier");
        assert_eq!(deduped[1].participants[0], "G2");
    }
}
