use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use butaman_dashboard::config::DashboardConfig;
use butaman_dashboard::data::render_table;
use butaman_dashboard::export::write_export;
use butaman_dashboard::sync::{HttpFetcher, SnapshotFetcher, SyncClient};
use butaman_dashboard::{events, ui, App, DataSource, FileSource, HttpSource};

#[derive(Parser, Debug)]
#[command(name = "butaman-dashboard")]
#[command(about = "Live terminal dashboard for Butaman ping monitor state")]
struct Args {
    /// Backend base URL (overrides config file and BUTAMAN_BASE_URL)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Config file (defaults to ./butaman.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read a saved /api/state document instead of polling the backend
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Export the current table to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args)?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        return match args.file {
            Some(ref path) => export_from_file(path, export_path),
            None => export_from_backend(&load_config(&args)?, export_path),
        };
    }

    if let Some(ref path) = args.file {
        let source = Box::new(FileSource::new(path));
        return run_tui(source, Duration::from_secs(1));
    }

    run_with_backend(&load_config(&args)?)
}

fn load_config(args: &Args) -> Result<DashboardConfig> {
    let config = DashboardConfig::load(args.config.as_deref())?;
    match args.url {
        Some(ref url) => config.with_base_url(url),
        None => Ok(config),
    }
}

/// Install the tracing subscriber.
///
/// The TUI owns the terminal, so interactive runs log only to `--log-file`.
/// Export runs log to stderr.
fn init_tracing(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = if let Some(ref path) = args.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
    } else if args.export.is_some() {
        builder.with_writer(io::stderr).try_init()
    } else {
        builder.with_writer(io::sink).try_init()
    };

    result.map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))
}

/// Run against the live backend
fn run_with_backend(config: &DashboardConfig) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let handle = SyncClient::http(&config.endpoint())?.start();
    let source = Box::new(HttpSource::new(handle));

    // Snapshot swaps are cheap to check, so look often
    let result = run_tui(source, Duration::from_millis(100));

    info!("shutting down");
    result
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, refresh_interval: Duration) -> Result<()> {
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

    let mut app = App::new(source);
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
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
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 10;

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
                    .style(ratatui::style::Style::default().fg(app.theme.medium));
                let top = (area.height / 2).saturating_sub(2);
                let centered =
                    ratatui::layout::Rect::new(0, top, area.width, 5u16.min(area.height - top));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Min(6),    // Targets table
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::targets::render(frame, app, chunks[1]);
            ui::common::render_status_bar(frame, app, chunks[2]);

            if app.show_detail_overlay {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Table border sits right below the header bar
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 1),
                _ => {}
            }
        }

        if last_refresh.elapsed() >= refresh_interval {
            let _ = app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}

/// Fetch the state once and export the rendered table
fn export_from_backend(config: &DashboardConfig, export_path: &Path) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let fetcher = HttpFetcher::new(config.endpoint())?;
    let snapshot = rt
        .block_on(fetcher.fetch())
        .with_context(|| format!("failed to fetch {}", fetcher.endpoint()))?;

    write_export(export_path, &render_table(&snapshot))?;
    info!(path = %export_path.display(), targets = snapshot.len(), "exported table");
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}

/// Read a saved state document and export the rendered table
fn export_from_file(state_path: &Path, export_path: &Path) -> Result<()> {
    let mut source = FileSource::new(state_path);
    let snapshot = source
        .poll()
        .ok_or_else(|| anyhow!(source.error().unwrap_or("no data").to_string()))?;

    write_export(export_path, &render_table(&snapshot))?;
    info!(path = %export_path.display(), targets = snapshot.len(), "exported table");
    println!("Exported dashboard state to: {}", export_path.display());
    Ok(())
}
