use crate::days::{AnchorMode, DayWindow};
use crate::errors::WatchError;
use crate::sports::{FavoriteTeam, TeamRule};
use crate::window::ViewingWindow;
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Every time and date is evaluated here, regardless of where the process runs.
pub const TARGET_TIMEZONE: Tz = chrono_tz::America::Los_Angeles;

/// Short zone tag shown next to start times.
pub const TARGET_TIMEZONE_TAG: &str = "PT";

/// Immutable selection configuration: ranked favorites, target zone, viewing
/// window and the span of days to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    favorites: Vec<FavoriteTeam>,
    timezone: Tz,
    window: ViewingWindow,
    days: DayWindow,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            favorites: ranked(default_favorites()),
            timezone: TARGET_TIMEZONE,
            window: ViewingWindow::default(),
            days: DayWindow::default(),
        }
    }
}

impl WatchConfig {
    /// Ranks follow list order. Keys must be unique and every favorite needs a league.
    pub fn new(favorites: Vec<FavoriteTeam>, timezone: Tz) -> Result<Self, WatchError> {
        let mut seen = HashSet::new();
        for fav in &favorites {
            if !seen.insert(fav.key.as_str()) {
                return Err(WatchError::Config(format!("duplicate favorite key '{}'", fav.key)));
            }
            if fav.league_id.trim().is_empty() {
                return Err(WatchError::Config(format!("favorite '{}' has no league", fav.key)));
            }
        }

        Ok(Self {
            favorites: ranked(favorites),
            timezone,
            window: ViewingWindow::default(),
            days: DayWindow::default(),
        })
    }

    pub fn with_window(mut self, window: ViewingWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_days(mut self, days: DayWindow) -> Self {
        self.days = days;
        self
    }

    pub fn favorites(&self) -> &[FavoriteTeam] {
        &self.favorites
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn window(&self) -> &ViewingWindow {
        &self.window
    }

    pub fn days(&self) -> &DayWindow {
        &self.days
    }

    /// Distinct leagues to query, in order of first appearance.
    pub fn leagues(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for fav in &self.favorites {
            if !out.iter().any(|l| l == &fav.league_id) {
                out.push(fav.league_id.clone());
            }
        }
        out
    }
}

fn ranked(mut favorites: Vec<FavoriteTeam>) -> Vec<FavoriteTeam> {
    for (rank, fav) in favorites.iter_mut().enumerate() {
        fav.rank = rank;
    }
    favorites
}

/// Priority list, highest first.
pub fn default_favorites() -> Vec<FavoriteTeam> {
    vec![
        FavoriteTeam::new("steelers", "Steelers (NFL)", "football/nfl", TeamRule::new(&["steelers"], &["PIT"])),
        FavoriteTeam::new("warriors", "Warriors (NBA)", "basketball/nba", TeamRule::new(&["warriors"], &["GS", "GSW"])),
        FavoriteTeam::new(
            "valkyries",
            "Valkyries (WNBA)",
            "basketball/wnba",
            TeamRule::new(&["valkyries", "golden state valkyries"], &["GS", "GSV"]),
        ),
        FavoriteTeam::new("cubs", "Cubs (MLB)", "baseball/mlb", TeamRule::new(&["cubs"], &["CHC"])),
        // MLB only; the NFL Giants are kept out by the league gate
        FavoriteTeam::new("giants", "Giants (MLB)", "baseball/mlb", TeamRule::new(&["giants"], &["SF", "SFG"])),
    ]
}

fn default_days() -> usize {
    7
}

fn default_http_timeout() -> u64 {
    10
}

/// Operational settings read from `config.json`. Favorites and timezone are fixed
/// and deliberately absent here.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppSettings {
    #[serde(default = "default_days")]
    pub days: usize,
    #[serde(default)]
    pub anchor: AnchorMode,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            days: default_days(),
            anchor: AnchorMode::default(),
            http_timeout_secs: default_http_timeout(),
            fetch_timeout_secs: None,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "wtwtw", "wtwtw").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Missing file means defaults.
    pub fn load() -> Result<Self, WatchError> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, WatchError> {
        let content = fs::read_to_string(path)
            .map_err(|e| WatchError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, WatchError> {
        let settings: AppSettings =
            serde_json::from_str(content).map_err(|e| WatchError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf, WatchError> {
        let path = Self::config_path()
            .ok_or_else(|| WatchError::Config("Cannot determine config directory".to_string()))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| WatchError::Config(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| WatchError::Config(e.to_string()))?;
        fs::write(&path, content).map_err(|e| WatchError::Config(e.to_string()))?;
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), WatchError> {
        if self.days == 0 {
            return Err(WatchError::Config("days must be at least 1".to_string()));
        }
        if self.http_timeout_secs == 0 {
            return Err(WatchError::Config("http_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn day_window(&self) -> DayWindow {
        DayWindow::new(self.anchor, self.days)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}
