use crate::errors::WatchError;
use crate::sports::{RawEvent, RawParticipant};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

pub const ESPN_BASE_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";

/// Per-league, per-day schedule provider.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Events for `league_id` (e.g. "baseball/mlb") on `date_key` (YYYYMMDD).
    async fn fetch(&self, league_id: &str, date_key: &str) -> Result<Vec<RawEvent>, WatchError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EspnResponse {
    pub events: Option<Vec<EspnEvent>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnEvent {
    pub id: Option<String>,
    pub date: Option<String>,       // ISO 8601 UTC, seconds often omitted
    pub name: Option<String>,       // "Chicago Cubs at San Francisco Giants"
    pub short_name: Option<String>, // "CHC @ SF"
    pub competitions: Option<Vec<EspnCompetition>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnCompetition {
    pub competitors: Option<Vec<EspnCompetitor>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnCompetitor {
    pub home_away: Option<String>, // "home" or "away"
    pub team: Option<EspnTeam>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EspnTeam {
    pub display_name: Option<String>, // "Chicago Cubs"
    pub abbreviation: Option<String>, // "CHC"
}

/// ESPN writes both `2024-06-10T23:10Z` and full RFC 3339.
pub fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

impl EspnEvent {
    /// Events without a usable start time cannot be placed in a window and are dropped.
    pub fn into_raw(self, league_id: &str) -> Option<RawEvent> {
        let start = match self.date.as_deref().and_then(parse_espn_date) {
            Some(start) => start,
            None => {
                debug!("Dropping {} event {:?}: unparseable date {:?}", league_id, self.id, self.date);
                return None;
            }
        };

        let participants = self
            .competitions
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|comp| comp.competitors)
            .unwrap_or_default()
            .into_iter()
            .map(|c| {
                let team = c.team.unwrap_or_default();
                RawParticipant::new(team.display_name.as_deref(), team.abbreviation.as_deref())
            })
            .collect();

        Some(RawEvent {
            id: self.id.unwrap_or_default(),
            display_name: self.name.or(self.short_name).unwrap_or_default(),
            start,
            league_id: league_id.to_string(),
            participants,
        })
    }
}

impl EspnResponse {
    pub fn into_events(self, league_id: &str) -> Vec<RawEvent> {
        self.events
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ev| ev.into_raw(league_id))
            .collect()
    }
}

pub fn parse_scoreboard(json: &str, league_id: &str) -> Result<Vec<RawEvent>, WatchError> {
    let response: EspnResponse = serde_json::from_str(json)?;
    Ok(response.into_events(league_id))
}

/// ESPN public scoreboard client. No API key needed.
#[derive(Debug, Clone)]
pub struct EspnScoreboard {
    client: Client,
    base_url: String,
}

impl EspnScoreboard {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("wtwtw/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: ESPN_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn scoreboard_url(&self, league_id: &str, date_key: &str) -> String {
        format!(
            "{}/{}/scoreboard?dates={}",
            self.base_url,
            league_id.trim_matches('/'),
            date_key
        )
    }
}

#[async_trait]
impl ScheduleSource for EspnScoreboard {
    #[instrument(skip(self))]
    async fn fetch(&self, league_id: &str, date_key: &str) -> Result<Vec<RawEvent>, WatchError> {
        let url = self.scoreboard_url(league_id, date_key);
        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(WatchError::Status(resp.status().as_u16(), url));
        }
        let body: EspnResponse = resp.json().await?;
        let events = body.into_events(league_id);
        debug!("{} events for {} on {}", events.len(), league_id, date_key);
        Ok(events)
    }
}
