use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a watch schedule
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WatchError {
    /// Request never produced a response (DNS, TCP, TLS, ...)
    #[error("Request to {0} failed: {1}")]
    Transport(String, String),

    /// Scoreboard endpoint answered with a non-success status
    #[error("Server returned {0} for {1}")]
    Status(u16, String),

    /// Response body was not a scoreboard document
    #[error("Failed to parse scoreboard: {0}")]
    Parse(String),

    /// Fetch did not settle in time
    #[error("Fetch for {0} timed out after {1:?}")]
    Timeout(String, Duration),

    /// Calendar arithmetic left chrono's supported range
    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WatchError {
    /// True for failures scoped to a single (league, day) fetch.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            WatchError::Transport(..)
                | WatchError::Status(..)
                | WatchError::Parse(_)
                | WatchError::Timeout(..)
        )
    }

    /// Get detailed diagnostic information about the error
    pub fn diagnostics(&self) -> String {
        match self {
            WatchError::Transport(url, source) => {
                format!("Transport Error\nURL: {}\nError: {}\nSuggestion: Check internet connection", url, source)
            }
            WatchError::Status(status, url) => {
                format!("Server Error\nStatus: {}\nURL: {}\nSuggestion: Scoreboard may be unavailable, try again later", status, url)
            }
            WatchError::Parse(source) => {
                format!("Parse Error\nError: {}\nSuggestion: Scoreboard format may have changed", source)
            }
            WatchError::Timeout(what, after) => {
                format!("Timeout\nRequest: {}\nAfter: {}s\nSuggestion: Raise fetch_timeout_secs", what, after.as_secs())
            }
            WatchError::DateOutOfRange(what) => {
                format!("Date Error\nDetail: {}\nSuggestion: Use a date closer to the present", what)
            }
            WatchError::Config(reason) => {
                format!("Configuration Error\nReason: {}\nSuggestion: Fix or delete config.json", reason)
            }
        }
    }
}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        if let Some(status) = err.status() {
            WatchError::Status(status.as_u16(), url)
        } else if err.is_decode() {
            WatchError::Parse(err.to_string())
        } else {
            WatchError::Transport(url, err.to_string())
        }
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Parse(err.to_string())
    }
}
