use crate::errors::WatchError;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A fixed local-time viewing interval `[start_minute, end_minute)` plus the
/// duration every event is assumed to last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewingWindow {
    pub start_minute: u32,
    pub end_minute: u32,
    pub assumed_duration_minutes: u32,
}

impl Default for ViewingWindow {
    fn default() -> Self {
        Self {
            start_minute: 17 * 60, // 5:00 PM
            end_minute: 20 * 60,   // 8:00 PM (exclusive)
            assumed_duration_minutes: 180,
        }
    }
}

impl ViewingWindow {
    pub fn new(start_minute: u32, end_minute: u32, assumed_duration_minutes: u32) -> Result<Self, WatchError> {
        if start_minute >= end_minute || end_minute > MINUTES_PER_DAY {
            return Err(WatchError::Config(format!(
                "viewing window {}..{} is not a same-day interval",
                start_minute, end_minute
            )));
        }
        if assumed_duration_minutes > MINUTES_PER_DAY {
            return Err(WatchError::Config(format!(
                "assumed duration of {} minutes is longer than a day",
                assumed_duration_minutes
            )));
        }
        Ok(Self {
            start_minute,
            end_minute,
            assumed_duration_minutes,
        })
    }

    /// Overlap test on local minutes. The end may run past midnight; only the
    /// same-day window matters so no rollover is applied.
    pub fn overlaps_minute(&self, start_minute: u32) -> bool {
        let end_minute = start_minute.saturating_add(self.assumed_duration_minutes);
        start_minute < self.end_minute && end_minute > self.start_minute
    }

    pub fn overlaps(&self, start: DateTime<Utc>, tz: Tz) -> bool {
        self.overlaps_minute(minute_of_day(start, tz))
    }

    /// "5:00 PM–8:00 PM"
    pub fn describe(&self) -> String {
        format!("{}–{}", clock_label(self.start_minute), clock_label(self.end_minute))
    }
}

/// Wall-clock minute of day (0..1440) of `start` in `tz`. DST is whatever the tz database says.
pub fn minute_of_day(start: DateTime<Utc>, tz: Tz) -> u32 {
    let local = start.with_timezone(&tz);
    local.hour() * 60 + local.minute()
}

/// Start time in the target zone, e.g. "7:05 PM".
pub fn format_local_time(start: DateTime<Utc>, tz: Tz) -> String {
    start.with_timezone(&tz).format("%-I:%M %p").to_string()
}

fn clock_label(minute: u32) -> String {
    let hour = (minute / 60) % 24;
    let (h12, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{}:{:02} {}", h12, minute % 60, suffix)
}
