use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use wtwtw_lib::config::{AppSettings, WatchConfig, TARGET_TIMEZONE, TARGET_TIMEZONE_TAG};
use wtwtw_lib::days::{AnchorMode, DayWindow};
use wtwtw_lib::errors::WatchError;
use wtwtw_lib::orchestrator::{RunState, RunUpdate, ScheduleOrchestrator};
use wtwtw_lib::scores::EspnScoreboard;
use wtwtw_lib::sports::DayResult;
use wtwtw_lib::window::format_local_time;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AnchorArg {
    Today,
    Monday,
}

impl From<AnchorArg> for AnchorMode {
    fn from(arg: AnchorArg) -> Self {
        match arg {
            AnchorArg::Today => AnchorMode::Today,
            AnchorArg::Monday => AnchorMode::MondayOfWeek,
        }
    }
}

/// What To Watch This Week: the best evening game for each upcoming day
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of days to evaluate
    #[arg(short, long)]
    days: Option<usize>,

    /// First day of the window
    #[arg(long, value_enum)]
    anchor: Option<AnchorArg>,

    /// Evaluate today through Saturday
    #[arg(long, conflicts_with_all = ["days", "anchor"])]
    rest_of_week: bool,

    /// Treat this Pacific-time date (YYYY-MM-DD) as today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Write a default config.json and exit
    #[arg(long)]
    init_config: bool,
}

fn resolve_today(date: Option<NaiveDate>) -> anyhow::Result<DateTime<Utc>> {
    let Some(date) = date else {
        return Ok(Utc::now());
    };
    // Local noon is never skipped or repeated by DST
    let noon = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid date {}", date))?;
    TARGET_TIMEZONE
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("{} does not exist in {}", noon, TARGET_TIMEZONE))
}

/// Print the long-form explanation before handing the error to anyhow.
fn report(err: WatchError) -> anyhow::Error {
    eprintln!("{}", err.diagnostics());
    anyhow::Error::new(err)
}

fn print_day(day: &DayResult, config: &WatchConfig) {
    println!("{} ({})", day.label, day.date.format("%b %-d"));
    match (&day.winner, day.headline()) {
        (Some(pick), Some(headline)) => {
            println!("  {}", headline);
            println!(
                "  Starts {} {}",
                format_local_time(pick.event.start, config.timezone()),
                TARGET_TIMEZONE_TAG
            );
            println!("  {}", pick.favorite.label);
        }
        _ => println!(
            "  No qualifying game in the {} {} window.",
            config.window().describe(),
            TARGET_TIMEZONE_TAG
        ),
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut settings = AppSettings::load().map_err(report)?;

    if args.init_config {
        let path = settings.save().map_err(report)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if let Some(days) = args.days {
        settings.days = days;
    }
    if let Some(anchor) = args.anchor {
        settings.anchor = anchor.into();
    }
    settings.validate().map_err(report)?;

    let today = resolve_today(args.date)?;
    let day_window = if args.rest_of_week {
        DayWindow::rest_of_week(today, TARGET_TIMEZONE)
    } else {
        settings.day_window()
    };

    let config = WatchConfig::default().with_days(day_window);
    let source = EspnScoreboard::new(settings.http_timeout());
    let orchestrator = ScheduleOrchestrator::new(source, config).with_fetch_timeout(settings.fetch_timeout());

    let (tx, mut rx) = mpsc::channel::<RunUpdate>(4);
    let mut state = RunState::default();
    let quiet = args.json;

    let render = async {
        while let Some(update) = rx.recv().await {
            let settled = !matches!(update, RunUpdate::Loading);
            if !settled && !quiet {
                eprintln!("Loading schedules…");
            }
            state.apply(update);
            if settled {
                break;
            }
        }
    };
    tokio::join!(orchestrator.publish(today, &tx), render);

    if let Some(error) = state.error {
        return Err(report(error));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state.results)?);
    } else {
        for day in &state.results {
            print_day(day, orchestrator.config());
        }
    }

    Ok(())
}
