pub mod config;
pub mod days;
pub mod errors;
pub mod matcher;
pub mod orchestrator;
pub mod scores;
pub mod selector;
pub mod sports;
pub mod window;

pub use config::{AppSettings, WatchConfig};
pub use errors::WatchError;
pub use orchestrator::{FetchErrorPolicy, RunState, RunUpdate, ScheduleOrchestrator};
pub use scores::{EspnScoreboard, ScheduleSource};
pub use sports::{Candidate, DayResult, FavoriteTeam, RawEvent, RawParticipant, TeamRule};
