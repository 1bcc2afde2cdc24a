use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use fleetwatch::app::write_render_state;
use fleetwatch::data::{FilterCriteria, OnlineState};
use fleetwatch::ui::Theme;
use fleetwatch::{
    events, ui, App, FileSource, HttpSource, Poller, Settings, TelemetrySource, ViewModel,
};

const DEFAULT_LOG_DIRECTIVE: &str = "fleetwatch=info";

#[derive(Parser, Debug)]
#[command(name = "fleetwatch")]
#[command(about = "Terminal dashboard for fleet telemetry")]
struct Args {
    /// Telemetry backend address (e.g., http://localhost:8000)
    #[arg(long, conflicts_with = "file")]
    endpoint: Option<String>,

    /// Read telemetry from a JSON file instead of the backend
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Configuration file (default: ./fleetwatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Units per page
    #[arg(long)]
    page_size: Option<usize>,

    /// Request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Initial online filter: any, online or offline
    #[arg(long, default_value = "any", value_parser = parse_online)]
    online: OnlineState,

    /// Initial minimum battery percentage
    #[arg(long, default_value_t = 0.0)]
    min_battery: f64,

    /// Initial unit id substring filter
    #[arg(long, default_value = "")]
    id_filter: String,

    /// Initial page (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Export the filtered page to a JSON file and exit
    #[arg(short, long, conflicts_with = "unit")]
    export: Option<PathBuf>,

    /// Look up a single unit by id, print it as JSON and exit
    #[arg(long, conflicts_with = "file")]
    unit: Option<String>,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_online(s: &str) -> Result<OnlineState, String> {
    match s.to_ascii_lowercase().as_str() {
        "any" | "all" => Ok(OnlineState::Any),
        "online" => Ok(OnlineState::Online),
        "offline" => Ok(OnlineState::Offline),
        other => Err(format!("expected any, online or offline, got '{other}'")),
    }
}

impl Args {
    fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            online_state: self.online,
            min_battery_pct: self.min_battery,
            id_substring: self.id_filter.clone(),
        }
    }
}

/// Where log output goes for the chosen mode.
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Discard,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;

    // One-shot modes log to stderr; the TUI owns the terminal.
    if let Some(ref id) = args.unit {
        init_logging(LogTarget::Stderr)?;
        return lookup_unit(&settings, id);
    }

    if let Some(ref export_path) = args.export {
        init_logging(LogTarget::Stderr)?;
        return export_to_file(&args, &settings, export_path);
    }

    match args.log_file {
        Some(ref path) => init_logging(LogTarget::File(path))?,
        None => init_logging(LogTarget::Discard)?,
    }
    run_tui(&args, &settings)
}

/// Merge file and environment settings with command-line overrides.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref endpoint) = args.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(interval) = args.interval_ms {
        settings.poll_interval_ms = interval;
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    if let Some(timeout) = args.timeout_ms {
        settings.request_timeout_ms = timeout;
    }

    settings.validate()?;
    Ok(settings)
}

fn init_logging(target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));

    match target {
        LogTarget::Stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Discard => {}
    }
    Ok(())
}

fn http_source(settings: &Settings) -> Result<HttpSource> {
    let source = HttpSource::builder()
        .endpoint(settings.endpoint.clone())
        .timeout(settings.request_timeout())
        .build()?;
    Ok(source)
}

fn build_source(args: &Args, settings: &Settings) -> Result<Arc<dyn TelemetrySource>> {
    match args.file {
        Some(ref path) => Ok(Arc::new(FileSource::new(path))),
        None => Ok(Arc::new(http_source(settings)?)),
    }
}

fn build_view_model(args: &Args, settings: &Settings) -> ViewModel {
    let mut view = ViewModel::new(settings.page_size, settings.thresholds);
    view.set_criteria(args.criteria());
    view.set_page(args.page);
    view
}

/// Fetch a single unit and print it as JSON
fn lookup_unit(settings: &Settings, id: &str) -> Result<()> {
    let source = http_source(settings)?;
    let rt = tokio::runtime::Runtime::new()?;

    let unit = rt.block_on(source.fetch_unit(id))?;
    println!("{}", serde_json::to_string_pretty(&unit)?);
    Ok(())
}

/// Run one poll cycle, apply filters and page, and write the result to a file
fn export_to_file(args: &Args, settings: &Settings, export_path: &Path) -> Result<()> {
    let poller = Poller::builder()
        .interval(settings.poll_interval())
        .build(build_source(args, settings)?);
    let rt = tokio::runtime::Runtime::new()?;

    let description = poller.source_description();
    let snapshot = rt
        .block_on(poller.poll_once())
        .with_context(|| format!("retrieval from {description} failed"))?;

    let mut view = build_view_model(args, settings);
    view.apply_snapshot(snapshot);
    let state = view.current();
    write_render_state(&state, export_path)?;

    info!(
        units = state.units.len(),
        matching = state.matching,
        page = state.current_page,
        "export written"
    );
    println!("Exported fleet state to: {}", export_path.display());
    Ok(())
}

/// Run the TUI with the poller in the background
fn run_tui(args: &Args, settings: &Settings) -> Result<()> {
    let source = build_source(args, settings)?;
    let description = source.description().to_string();
    let poller = Poller::builder()
        .interval(settings.poll_interval())
        .build(source);

    // The poller runs on the runtime's workers while this thread draws.
    let rt = tokio::runtime::Runtime::new()?;
    let (tx, rx) = mpsc::channel(16);
    let handle = {
        let _guard = rt.enter();
        poller.spawn(tx)
    };

    let mut app = App::new(build_view_model(args, settings), description)
        .with_events(rx)
        .with_theme(Theme::auto_detect());

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
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    handle.stop();
    rt.block_on(handle.wait());
    rt.shutdown_timeout(Duration::from_millis(500));

    if let Err(ref e) = result {
        error!(error = %e, "terminal loop failed");
    }
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;
    // Header (1) + table border (1) + table header (1)
    const FIRST_TABLE_ROW: u16 = 3;

    while app.running {
        app.drain_events();

        let mut table_offset = app.table_offset;
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
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(8),    // Unit table
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            table_offset = ui::table::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;
        app.table_offset = table_offset;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    events::handle_key_event(app, key)
                }
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, FIRST_TABLE_ROW),
                _ => {}
            }
        }
    }

    Ok(())
}
