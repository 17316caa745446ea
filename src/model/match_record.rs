use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Competition name used when none can be extracted.
pub const UNKNOWN_EVENT: &str = "Unknown Event";

/// A single match as seen on the upcoming listing or the results feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    /// Upstream match id, stable across fetches of the same listing.
    pub identity: String,
    /// Team A and team B, in display order.
    pub participants: [String; 2],
    pub competition: String,
    pub scheduled_time: Option<DateTime<Utc>>,
    /// Upstream star rating, 0 to 5.
    pub importance: u8,
    /// `"<a>-<b>"`, only set for finished matches.
    pub outcome: Option<String>,
    /// Relative path of the match page, e.g. `/matches/2370000/faze-vs-navi-iem-cologne-2025`.
    pub detail_path: Option<String>,
    /// Display hint only.
    pub live: bool,
}

/// Display-only status derived from a [`MatchRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Live,
    Finished,
}

impl MatchRecord {
    pub fn team_a(&self) -> &str {
        &self.participants[0]
    }

    pub fn team_b(&self) -> &str {
        &self.participants[1]
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Upcoming and still waiting for its start time to be resolved.
    pub fn is_pending(&self) -> bool {
        !self.is_finished() && self.scheduled_time.is_none() && self.detail_path.is_some()
    }

    pub fn status(&self) -> MatchStatus {
        if self.is_finished() {
            MatchStatus::Finished
        } else if self.live {
            MatchStatus::Live
        } else {
            MatchStatus::Upcoming
        }
    }

    /// Case-insensitive substring match against either participant.
    pub fn has_team(&self, team_name: &str) -> bool {
        let needle = team_name.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }
        self.participants
            .iter()
            .any(|p| p.to_lowercase().contains(&needle))
    }

    /// Returns a copy with the start time filled in. A time that is
    /// already set is never replaced.
    pub fn with_scheduled_time(mut self, time: Option<DateTime<Utc>>) -> Self {
        if self.scheduled_time.is_none() {
            self.scheduled_time = time;
        }
        self
    }
}

impl Display for MatchRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.team_a(), self.team_b())?;
        match (&self.outcome, self.scheduled_time) {
            (Some(score), _) => write!(f, " - {score}\n📍 {}", self.competition),
            (None, Some(time)) => {
                write!(f, "\n⏰ {} | 📍 {}", time.format("%H:%M"), self.competition)
            }
            (None, None) => write!(f, "\n📍 {}", self.competition),
        }
    }
}

/// Sort soonest first with unknown times last, then by importance descending.
pub fn sort_by_schedule(records: &mut [MatchRecord]) {
    records.sort_by_key(|r| {
        (
            r.scheduled_time.is_none(),
            r.scheduled_time,
            Reverse(r.importance),
        )
    });
}
