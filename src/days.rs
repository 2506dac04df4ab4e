use crate::errors::WatchError;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Where the run of evaluated days begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    #[default]
    Today,
    MondayOfWeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub anchor: AnchorMode,
    pub length: usize,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self {
            anchor: AnchorMode::Today,
            length: 7,
        }
    }
}

impl DayWindow {
    pub fn new(anchor: AnchorMode, length: usize) -> Self {
        Self { anchor, length }
    }

    /// Today through Saturday inclusive, in `tz`.
    pub fn rest_of_week(today: DateTime<Utc>, tz: Tz) -> Self {
        let dow = local_date(today, tz).weekday().num_days_from_sunday() as usize;
        Self {
            anchor: AnchorMode::Today,
            length: 7 - dow,
        }
    }
}

/// One calendar date to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub label: String,     // "Monday"
    pub query_key: String, // "20240610"
}

impl DayPlan {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            label: date.format("%A").to_string(),
            query_key: query_key(date),
        }
    }
}

/// Zero-padded YYYYMMDD, as the scoreboard `dates` parameter expects.
pub fn query_key(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Calendar date of `now` in `tz`; never the process's local zone.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

pub fn build_days(today: DateTime<Utc>, window: &DayWindow, tz: Tz) -> Result<Vec<DayPlan>, WatchError> {
    let local_today = local_date(today, tz);
    let first = match window.anchor {
        AnchorMode::Today => local_today,
        AnchorMode::MondayOfWeek => {
            let back = local_today.weekday().num_days_from_monday() as u64;
            local_today
                .checked_sub_days(Days::new(back))
                .ok_or_else(|| WatchError::DateOutOfRange(format!("Monday before {}", local_today)))?
        }
    };

    (0..window.length as u64)
        .map(|offset| {
            first
                .checked_add_days(Days::new(offset))
                .map(DayPlan::new)
                .ok_or_else(|| WatchError::DateOutOfRange(format!("{} + {} days", first, offset)))
        })
        .collect()
}
