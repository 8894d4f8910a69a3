// Binary includes library modules - some public API items are only for library consumers
#![allow(unused)]

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

mod app;
mod config;
mod data;
mod events;
mod source;
mod ui;

use app::App;
use crate::config::Settings;
use data::{
    duration::parse_duration, DateRange, HistoryData, Monitor, RollingSeries, SnapshotStore,
    Thresholds,
};
use source::{ApiClient, ApiHandle, FileSource, HttpSource, Reading, ReadingSource};

#[derive(Parser, Debug)]
#[command(name = "presswatch")]
#[command(about = "Terminal dashboard for monitoring front/rear line pressure sensors")]
struct Args {
    /// Base URL of the sensor API (e.g. http://raspi02:5300)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read realtime values from a JSON file instead of the API
    #[arg(short, long, conflicts_with = "url")]
    file: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Realtime poll interval (e.g. "500ms", "2s")
    #[arg(long)]
    poll_interval: Option<String>,

    /// Chart append interval (e.g. "1s")
    #[arg(long)]
    chart_interval: Option<String>,

    /// Idle threshold in MPa
    #[arg(long)]
    idle_threshold: Option<f64>,

    /// Low-pressure alarm threshold in MPa
    #[arg(long)]
    low_threshold: Option<f64>,

    /// Rolling chart capacity in samples
    #[arg(long)]
    capacity: Option<usize>,

    /// Chart seeding policy: "fixed-window" or "history-replay"
    #[arg(long)]
    seed_policy: Option<String>,

    /// Sample label policy: "wall-clock" or "reading-timestamp"
    #[arg(long)]
    label_policy: Option<String>,

    /// Path of the chart state file
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Snapshot staleness window (e.g. "5m")
    #[arg(long)]
    stale_after: Option<String>,

    /// Write diagnostic logs to this file (off by default)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Theme: "dark", "light", or "auto"
    #[arg(long, default_value = "auto")]
    theme: String,

    /// Export a history range as CSV to this path and exit
    #[arg(short, long, conflicts_with = "file")]
    export: Option<PathBuf>,

    /// Start date for --export (YYYY-MM-DD, default yesterday)
    #[arg(long, requires = "export")]
    start: Option<NaiveDate>,

    /// End date for --export (YYYY-MM-DD, default today)
    #[arg(long, requires = "export")]
    end: Option<NaiveDate>,
}

impl Args {
    /// Fold CLI flags over the loaded settings.
    fn apply_to(&self, settings: &mut Settings) {
        if let Some(ref url) = self.url {
            settings.url = url.clone();
        }
        if let Some(ref v) = self.poll_interval {
            settings.poll_interval = v.clone();
        }
        if let Some(ref v) = self.chart_interval {
            settings.chart_interval = v.clone();
        }
        if let Some(v) = self.idle_threshold {
            settings.idle_threshold = v;
        }
        if let Some(v) = self.low_threshold {
            settings.low_threshold = v;
        }
        if let Some(v) = self.capacity {
            settings.capacity = v;
        }
        if let Some(ref v) = self.seed_policy {
            settings.seed_policy = v.clone();
        }
        if let Some(ref v) = self.label_policy {
            settings.label_policy = v.clone();
        }
        if let Some(ref v) = self.state_file {
            settings.state_file = v.display().to_string();
        }
        if let Some(ref v) = self.stale_after {
            settings.stale_after = v.clone();
        }
    }
}

// Averages refresh every 10s, logs every 5s, matching how quickly the
// backing tables actually change.
const AVERAGES_INTERVAL: Duration = Duration::from_secs(10);
const LOGS_INTERVAL: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply_to(&mut settings);

    if let Some(ref log_path) = args.log_file {
        init_logging(log_path)?;
    }

    let thresholds = Thresholds {
        idle: settings.idle_threshold,
        low: settings.low_threshold,
    };
    thresholds.validate()?;

    let poll_interval = parse_duration(&settings.poll_interval)
        .context("invalid poll interval")?;
    let chart_interval = parse_duration(&settings.chart_interval)
        .context("invalid chart interval")?;
    let stale_after = parse_duration(&settings.stale_after)
        .context("invalid staleness window")?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return export_to_file(&settings, &args, export_path);
    }

    let series = RollingSeries::new(
        settings.capacity,
        settings.seed_policy()?,
        settings.label_policy()?,
    );
    let store = SnapshotStore::new(&settings.state_file, stale_after);
    let monitor = Monitor::new(thresholds);

    // Handle file-based mode (no API, charts only)
    if let Some(ref path) = args.file {
        let source = Box::new(FileSource::new(path));
        let mut app = build_app(source, None, monitor, series, store, &[]);
        apply_theme(&mut app, &args.theme);
        app.set_status_message(format!(
            "Watching {} every {}",
            path.display(),
            data::duration::format_duration(poll_interval)
        ));
        return run_tui(app, poll_interval, chart_interval);
    }

    // Default: live API mode. The runtime must outlive the TUI loop since
    // the poller and API worker run on it.
    let rt = tokio::runtime::Runtime::new()?;

    let api = ApiClient::new(&settings.url)?;

    // Seed the chart: a fresh-enough snapshot wins, otherwise replay
    // recent history. Neither is required to start.
    let restored = store.try_restore(Utc::now());
    let history = if restored.is_none() {
        match rt.block_on(api.recent_history()) {
            Ok(records) => seed_readings(records),
            Err(e) => {
                tracing::warn!("history seed unavailable: {e}");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    // The spawns need a runtime context; the tasks keep running on `rt`
    // after the guard drops.
    let (source, handle) = {
        let _guard = rt.enter();
        let source = Box::new(HttpSource::spawn(api.clone(), poll_interval));
        let handle = ApiHandle::spawn(api, AVERAGES_INTERVAL, LOGS_INTERVAL);
        (source, handle)
    };

    let mut series = series;
    series.initialize(restored, &history);

    let mut app = App::new(source, Some(handle), monitor, series, store);
    apply_theme(&mut app, &args.theme);

    let result = run_tui(app, poll_interval, chart_interval);
    rt.shutdown_timeout(Duration::from_secs(1));
    result
}

fn build_app(
    source: Box<dyn ReadingSource>,
    handle: Option<ApiHandle>,
    monitor: Monitor,
    mut series: RollingSeries,
    store: SnapshotStore,
    history: &[Reading],
) -> App {
    let restored = store.try_restore(Utc::now());
    series.initialize(restored, history);
    App::new(source, handle, monitor, series, store)
}

fn apply_theme(app: &mut App, theme: &str) {
    app.theme = match theme {
        "dark" => ui::Theme::dark(),
        "light" => ui::Theme::light(),
        _ => ui::Theme::auto_detect(),
    };
}

/// History entries missing either channel cannot seed the live chart.
fn seed_readings(records: Vec<source::LogRecord>) -> Vec<Reading> {
    records
        .into_iter()
        .filter_map(|rec| match (rec.front_pressure, rec.rear_pressure) {
            (Some(front), Some(rear)) => Some(Reading {
                front,
                rear,
                timestamp: rec.timestamp,
            }),
            _ => None,
        })
        .collect()
}

fn init_logging(path: &std::path::Path) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    let file = std::fs::File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("presswatch=info".parse()?))
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the TUI with the given app state.
fn run_tui(mut app: App, poll_interval: Duration, chart_interval: Duration) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, poll_interval, chart_interval);

    // Persist the chart before tearing the terminal down
    app.final_snapshot();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poll_interval: Duration,
    chart_interval: Duration,
) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 16;

    let mut last_poll = Instant::now();
    let mut last_chart = Instant::now();

    // First poll may race the source task; a miss just shows "waiting".
    app.poll_reading();

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered =
                    ratatui::layout::Rect::new(0, area.height.saturating_sub(4) / 2, area.width, 5);
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::render(frame, app);
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(50))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }

        // The realtime poll and the chart append run on independent
        // cadences; a chart tick takes whatever the last poll produced.
        if last_poll.elapsed() >= poll_interval {
            app.poll_reading();
            last_poll = Instant::now();
        }
        if last_chart.elapsed() >= chart_interval {
            app.tick_chart(Utc::now());
            last_chart = Instant::now();
        }

        app.drain_api_updates();
    }

    Ok(())
}

/// Fetch a history range and write it as CSV, no TUI.
fn export_to_file(settings: &Settings, args: &Args, export_path: &std::path::Path) -> Result<()> {
    let range = {
        let mut range = DateRange::last_day();
        if let Some(start) = args.start {
            range.start = start;
        }
        if let Some(end) = args.end {
            range.end = end;
        }
        anyhow::ensure!(range.start <= range.end, "start date is after end date");
        range
    };

    let rt = tokio::runtime::Runtime::new()?;
    let api = ApiClient::new(&settings.url)?;
    let entries = rt
        .block_on(api.history_range(range))
        .with_context(|| format!("failed to fetch history for {range}"))?;

    let data = HistoryData::new(range, entries);
    let path = if export_path.is_dir() {
        export_path.join(data.csv_filename())
    } else {
        export_path.to_path_buf()
    };
    std::fs::write(&path, data.to_csv())
        .with_context(|| format!("cannot write {}", path.display()))?;

    println!(
        "Exported {} readings ({}) to: {}",
        data.entries.len(),
        range,
        path.display()
    );
    Ok(())
}
