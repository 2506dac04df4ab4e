use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use wtwtw_lib::config::WatchConfig;
use wtwtw_lib::days::{AnchorMode, DayWindow};
use wtwtw_lib::errors::WatchError;
use wtwtw_lib::orchestrator::{RunState, RunUpdate, ScheduleOrchestrator};
use wtwtw_lib::scores::{parse_scoreboard, ScheduleSource};
use wtwtw_lib::sports::{RawEvent, RawParticipant};

/// In-memory scoreboard keyed by (league, YYYYMMDD). Unknown keys return no events.
#[derive(Default)]
struct ScriptedSource {
    responses: HashMap<(String, String), Result<Vec<RawEvent>, WatchError>>,
    slow: Vec<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
    kill_switch: Option<Arc<AtomicBool>>,
}

impl ScriptedSource {
    fn with(mut self, league: &str, key: &str, response: Result<Vec<RawEvent>, WatchError>) -> Self {
        self.responses.insert((league.to_string(), key.to_string()), response);
        self
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScheduleSource for ScriptedSource {
    async fn fetch(&self, league_id: &str, date_key: &str) -> Result<Vec<RawEvent>, WatchError> {
        self.calls
            .lock()
            .unwrap()
            .push((league_id.to_string(), date_key.to_string()));
        if let Some(flag) = &self.kill_switch {
            flag.store(false, Ordering::SeqCst);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.slow.iter().any(|l| l == league_id) {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        self.responses
            .get(&(league_id.to_string(), date_key.to_string()))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn today() -> DateTime<Utc> {
    // Monday 2024-06-10, noon Pacific
    Los_Angeles.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap().with_timezone(&Utc)
}

fn cubs_game(id: &str, day: u32, hour: u32) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        display_name: format!("Chicago Cubs game {}", id),
        start: Los_Angeles.with_ymd_and_hms(2024, 6, day, hour, 10, 0).unwrap().with_timezone(&Utc),
        league_id: "baseball/mlb".to_string(),
        participants: vec![
            RawParticipant::new(Some("Chicago Cubs"), Some("CHC")),
            RawParticipant::new(Some("New York Mets"), Some("NYM")),
        ],
    }
}

fn five_days() -> WatchConfig {
    WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 5))
}

#[tokio::test]
async fn test_one_result_per_day_in_order() {
    let source = ScriptedSource::default()
        .with("baseball/mlb", "20240610", Ok(vec![cubs_game("mon", 10, 18)]))
        .with("baseball/mlb", "20240612", Ok(vec![cubs_game("wed", 12, 11)]));
    let orchestrator = ScheduleOrchestrator::new(source, five_days());

    let results = orchestrator.run(today()).await.unwrap();
    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]);

    assert_eq!(results[0].winner.as_ref().unwrap().event.id, "mon");
    assert!(results[1].winner.is_none());
    assert!(results[2].winner.is_none(), "11:10 game ends before the window opens");
}

#[tokio::test]
async fn test_every_league_queried_once_per_day() {
    let orchestrator = ScheduleOrchestrator::new(ScriptedSource::default(), five_days());
    orchestrator.run(today()).await.unwrap();

    let calls = orchestrator.source().calls();
    assert_eq!(calls.len(), 5 * 4, "four distinct leagues for five days");

    // Days never interleave: all of Monday's fetches come before Tuesday's
    let keys: Vec<&str> = calls.iter().map(|(_, k)| k.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[tokio::test]
async fn test_failed_fetches_yield_empty_day() {
    let mut source = ScriptedSource::default();
    for league in WatchConfig::default().leagues() {
        source = source.with(&league, "20240610", Err(WatchError::Status(503, league.clone())));
    }
    let config = WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 1));
    let orchestrator = ScheduleOrchestrator::new(source, config);

    let results = orchestrator.run(today()).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].winner.is_none());
}

#[tokio::test]
async fn test_one_failing_league_does_not_hide_others() {
    let source = ScriptedSource::default()
        .with("football/nfl", "20240610", Err(WatchError::Transport("nfl".into(), "reset".into())))
        .with("baseball/mlb", "20240610", Ok(vec![cubs_game("ok", 10, 19)]));
    let config = WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 1));
    let results = ScheduleOrchestrator::new(source, config).run(today()).await.unwrap();
    assert_eq!(results[0].winner.as_ref().unwrap().event.id, "ok");
}

#[tokio::test(start_paused = true)]
async fn test_slow_league_times_out_as_empty() {
    let source = ScriptedSource {
        slow: vec!["football/nfl".to_string()],
        ..Default::default()
    }
    .with("baseball/mlb", "20240610", Ok(vec![cubs_game("mlb", 10, 18)]));
    let config = WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 1));
    let orchestrator = ScheduleOrchestrator::new(source, config).with_fetch_timeout(Some(Duration::from_secs(5)));

    let results = orchestrator.run(today()).await.unwrap();
    assert_eq!(results[0].winner.as_ref().unwrap().event.id, "mlb");
}

#[tokio::test(start_paused = true)]
async fn test_leagues_for_a_day_are_fetched_concurrently() {
    let source = ScriptedSource {
        delay: Some(Duration::from_secs(10)),
        ..Default::default()
    }
    .with("baseball/mlb", "20240610", Ok(vec![cubs_game("mlb", 10, 18)]));
    let config = WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 1));
    let orchestrator = ScheduleOrchestrator::new(source, config);

    let started = tokio::time::Instant::now();
    let results = orchestrator.run(today()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(orchestrator.source().calls().len(), 4);
    assert_eq!(results[0].winner.as_ref().unwrap().event.id, "mlb");
    assert!(
        elapsed >= Duration::from_secs(10) && elapsed < Duration::from_secs(20),
        "four 10s fetches should overlap, took {:?}",
        elapsed
    );
}

#[tokio::test(start_paused = true)]
async fn test_days_are_fetched_one_after_another() {
    let source = ScriptedSource {
        delay: Some(Duration::from_secs(10)),
        ..Default::default()
    };
    let orchestrator = ScheduleOrchestrator::new(source, WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 3)));

    let started = tokio::time::Instant::now();
    orchestrator.run(today()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(40),
        "three days should take three fetch rounds, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_publish_reports_loading_then_results() {
    let orchestrator = ScheduleOrchestrator::new(ScriptedSource::default(), five_days());
    let (tx, mut rx) = mpsc::channel(4);

    orchestrator.publish(today(), &tx).await;

    let mut state = RunState::default();
    let first = rx.recv().await.unwrap();
    assert_eq!(first, RunUpdate::Loading);
    state.apply(first);
    assert!(state.loading);

    state.apply(rx.recv().await.unwrap());
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.results.len(), 5);
}

#[tokio::test]
async fn test_dropped_receiver_abandons_run() {
    let orchestrator = ScheduleOrchestrator::new(ScriptedSource::default(), five_days());
    let (tx, rx) = mpsc::channel(4);
    drop(rx);

    orchestrator.publish(today(), &tx).await;
    assert!(orchestrator.source().calls().is_empty());
}

#[tokio::test]
async fn test_cleared_alive_flag_stops_after_current_day() {
    let alive = Arc::new(AtomicBool::new(true));
    let source = ScriptedSource {
        kill_switch: Some(alive.clone()),
        ..Default::default()
    };
    let orchestrator = ScheduleOrchestrator::new(source, five_days());

    let outcome = orchestrator.run_until(today(), &alive).await.unwrap();
    assert!(outcome.is_none(), "abandoned runs publish nothing");

    let calls = orchestrator.source().calls();
    assert_eq!(calls.len(), 4, "only the first day's fan-out ran");
    assert!(calls.iter().all(|(_, key)| key == "20240610"));
}

#[tokio::test]
async fn test_scoreboard_json_through_orchestrator() {
    let doc = serde_json::json!({
        "events": [{
            "id": "401581",
            "date": "2024-06-11T01:15Z",
            "name": "Golden State Valkyries at Seattle Storm",
            "competitions": [{ "competitors": [
                { "homeAway": "home", "team": { "displayName": "Seattle Storm", "abbreviation": "SEA" } },
                { "homeAway": "away", "team": { "displayName": "Golden State Valkyries", "abbreviation": "GS" } }
            ]}]
        }]
    });
    let events = parse_scoreboard(&doc.to_string(), "basketball/wnba").unwrap();
    let source = ScriptedSource::default().with("basketball/wnba", "20240610", Ok(events));
    let config = WatchConfig::default().with_days(DayWindow::new(AnchorMode::Today, 1));

    let results = ScheduleOrchestrator::new(source, config).run(today()).await.unwrap();
    let pick = results[0].winner.as_ref().unwrap();
    assert_eq!(pick.favorite.label, "Valkyries (WNBA)");
    assert_eq!(results[0].headline(), Some("Golden State Valkyries at Seattle Storm"));
}
