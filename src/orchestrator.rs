//! Day-by-day schedule evaluation.
//!
//! Days run strictly in order. Within a day every league is fetched
//! concurrently and the day waits for all of them to settle before the
//! selector runs; the next day starts only after that join.

use crate::config::WatchConfig;
use crate::days::{build_days, DayPlan};
use crate::errors::WatchError;
use crate::scores::ScheduleSource;
use crate::selector::select_winner;
use crate::sports::{DayBucket, DayResult, RawEvent};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What to do with a failed (league, day) fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchErrorPolicy {
    /// Log it and treat the league as having no events that day.
    #[default]
    IgnoreAndEmpty,
}

impl FetchErrorPolicy {
    pub fn recover(&self, league_id: &str, date_key: &str, result: Result<Vec<RawEvent>, WatchError>) -> Vec<RawEvent> {
        match (self, result) {
            (_, Ok(events)) => events,
            (FetchErrorPolicy::IgnoreAndEmpty, Err(e)) if e.is_fetch_failure() => {
                warn!("Ignoring failed fetch for {} on {}: {}", league_id, date_key, e);
                Vec::new()
            }
            (FetchErrorPolicy::IgnoreAndEmpty, Err(e)) => {
                error!("Unexpected error from source for {} on {}: {}", league_id, date_key, e);
                Vec::new()
            }
        }
    }
}

/// State transitions published to whoever presents the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunUpdate {
    Loading,
    Finished(Vec<DayResult>),
    Failed(WatchError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub loading: bool,
    pub error: Option<WatchError>,
    pub results: Vec<DayResult>,
}

impl RunState {
    pub fn apply(&mut self, update: RunUpdate) {
        match update {
            RunUpdate::Loading => {
                self.loading = true;
                self.error = None;
            }
            RunUpdate::Finished(results) => {
                self.results = results;
                self.loading = false;
            }
            RunUpdate::Failed(err) => {
                // A failed run never shows a partial list
                self.results.clear();
                self.error = Some(err);
                self.loading = false;
            }
        }
    }

    /// Error text for display, if the run failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

pub struct ScheduleOrchestrator<S: ScheduleSource> {
    source: S,
    config: WatchConfig,
    policy: FetchErrorPolicy,
    fetch_timeout: Option<Duration>,
}

impl<S: ScheduleSource> ScheduleOrchestrator<S> {
    pub fn new(source: S, config: WatchConfig) -> Self {
        Self {
            source,
            config,
            policy: FetchErrorPolicy::default(),
            fetch_timeout: None,
        }
    }

    /// A fetch that has not settled after `limit` counts as failed.
    pub fn with_fetch_timeout(mut self, limit: Option<Duration>) -> Self {
        self.fetch_timeout = limit;
        self
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&self, today: DateTime<Utc>) -> Result<Vec<DayResult>, WatchError> {
        let results = self.run_while(today, || true).await?;
        Ok(results.unwrap_or_default())
    }

    /// Like `run`, but gives up between days once `alive` is cleared.
    /// `Ok(None)` means the run was abandoned and nothing should be shown.
    pub async fn run_until(&self, today: DateTime<Utc>, alive: &AtomicBool) -> Result<Option<Vec<DayResult>>, WatchError> {
        self.run_while(today, || alive.load(Ordering::SeqCst)).await
    }

    /// Drives a full run and reports it on `tx`. Dropping the receiver abandons the run.
    pub async fn publish(&self, today: DateTime<Utc>, tx: &mpsc::Sender<RunUpdate>) {
        if tx.send(RunUpdate::Loading).await.is_err() {
            return;
        }

        match self.run_while(today, || !tx.is_closed()).await {
            Ok(Some(results)) => {
                let _ = tx.send(RunUpdate::Finished(results)).await;
            }
            Ok(None) => debug!("Run abandoned, nothing published"),
            Err(e) => {
                let _ = tx.send(RunUpdate::Failed(e)).await;
            }
        }
    }

    async fn run_while<F>(&self, today: DateTime<Utc>, alive: F) -> Result<Option<Vec<DayResult>>, WatchError>
    where
        F: Fn() -> bool,
    {
        let tz = self.config.timezone();
        let plans = build_days(today, self.config.days(), tz)?;
        info!("Evaluating {} days from {}", plans.len(), today.with_timezone(&tz).date_naive());

        let mut results = Vec::with_capacity(plans.len());
        for plan in &plans {
            if !alive() {
                return Ok(None);
            }

            let bucket = self.collect_day(plan).await;
            let winner = select_winner(&bucket.raw_events, self.config.favorites(), self.config.window(), tz);
            match &winner {
                Some(c) => info!("{} {}: {} ({})", plan.label, plan.query_key, c.event.display_name, c.favorite.label),
                None => info!("{} {}: no qualifying game", plan.label, plan.query_key),
            }

            results.push(DayResult {
                date: plan.date,
                label: plan.label.clone(),
                winner,
            });
        }

        if !alive() {
            return Ok(None);
        }
        Ok(Some(results))
    }

    /// Fan out one fetch per league for `plan` and join them.
    pub async fn collect_day(&self, plan: &DayPlan) -> DayBucket {
        let leagues = self.config.leagues();
        let fetches = leagues.iter().map(|league| self.fetch_league(league, &plan.query_key));
        let settled = join_all(fetches).await;

        let raw_events: Vec<RawEvent> = settled.into_iter().flatten().collect();
        debug!("{} events across {} leagues for {}", raw_events.len(), leagues.len(), plan.query_key);

        DayBucket {
            date: plan.date,
            query_key: plan.query_key.clone(),
            raw_events,
        }
    }

    async fn fetch_league(&self, league_id: &str, date_key: &str) -> Vec<RawEvent> {
        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.source.fetch(league_id, date_key)).await {
                Ok(result) => result,
                Err(_) => Err(WatchError::Timeout(format!("{} {}", league_id, date_key), limit)),
            },
            None => self.source.fetch(league_id, date_key).await,
        };
        self.policy.recover(league_id, date_key, result)
    }
}
