use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Name fragments and abbreviation codes that identify one team within its league.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRule {
    pub name_fragments: Vec<String>, // lowercase, substring match
    pub abbreviations: Vec<String>,  // uppercase, exact match
}

impl TeamRule {
    pub fn new(name_fragments: &[&str], abbreviations: &[&str]) -> Self {
        Self {
            name_fragments: name_fragments.iter().map(|s| s.to_lowercase()).collect(),
            abbreviations: abbreviations.iter().map(|s| s.to_uppercase()).collect(),
        }
    }
}

/// A ranked team of interest. Rank 0 is the most wanted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteTeam {
    pub key: String,
    pub label: String,     // "Steelers (NFL)"
    pub league_id: String, // ESPN sport/league path, e.g. "football/nfl"
    pub rank: usize,
    pub rule: TeamRule,
}

impl FavoriteTeam {
    /// Rank is assigned from list position when the favorite joins a `WatchConfig`.
    pub fn new(key: &str, label: &str, league_id: &str, rule: TeamRule) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            league_id: league_id.to_string(),
            rank: 0,
            rule,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawParticipant {
    pub display_name: String,
    pub abbreviation: String,
}

impl RawParticipant {
    /// Missing fields degrade to empty strings, which never match anything.
    pub fn new(display_name: Option<&str>, abbreviation: Option<&str>) -> Self {
        Self {
            display_name: display_name.unwrap_or_default().to_string(),
            abbreviation: abbreviation.unwrap_or_default().to_string(),
        }
    }
}

/// One scheduled event as reported by a league scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub display_name: String, // "Chicago Cubs at San Francisco Giants"
    pub start: DateTime<Utc>,
    pub league_id: String,
    pub participants: Vec<RawParticipant>,
}

/// All events collected across leagues for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub query_key: String, // YYYYMMDD
    pub raw_events: Vec<RawEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub favorite: FavoriteTeam,
    pub event: RawEvent,
}

impl Candidate {
    pub fn rank(&self) -> usize {
        self.favorite.rank
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayResult {
    pub date: NaiveDate,
    pub label: String, // full weekday name
    pub winner: Option<Candidate>,
}

impl DayResult {
    /// Event title for display, falling back to "Game" when the scoreboard left it blank.
    pub fn headline(&self) -> Option<&str> {
        self.winner.as_ref().map(|c| {
            let name = c.event.display_name.trim();
            if name.is_empty() {
                "Game"
            } else {
                name
            }
        })
    }
}
