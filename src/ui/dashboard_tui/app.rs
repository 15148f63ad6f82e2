use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::core::config::Config;
use crate::core::runtime::{DashboardCommand, DashboardRuntime, DashboardSnapshot};
use crate::core::sentiment::DashboardState;

use super::event_handler::DashboardEvent;
use super::render::render_ui;

type DashboardTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// How long a transient status message stays in the header
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Dashboard application state
pub struct DashboardApp {
    pub snapshot: Arc<DashboardSnapshot>,
    pub api_base: String,
    pub live_url: String,
    pub should_quit: bool,
    pub show_help: bool,
    pub paused: bool,
    pub status_message: Option<String>,
    status_set_at: Option<Instant>,
    /// Fetch outcome count when a refresh was requested; the refresh message
    /// stays until a newer outcome arrives
    refresh_baseline: Option<u64>,
    /// Outcome count of the newest snapshot seen, paused or not
    latest_fetch_outcomes: u64,
}

impl DashboardApp {
    pub fn new(config: &Config, live_url: String) -> Self {
        Self {
            snapshot: Arc::new(DashboardSnapshot::new(DashboardState::with_capacities(
                config.capacities(),
            ))),
            api_base: config.api_base.clone(),
            live_url,
            should_quit: false,
            show_help: false,
            paused: false,
            status_message: None,
            status_set_at: None,
            refresh_baseline: None,
            latest_fetch_outcomes: 0,
        }
    }

    /// Take a new snapshot unless the view is paused
    pub fn update_snapshot(&mut self, snapshot: Arc<DashboardSnapshot>) {
        self.latest_fetch_outcomes = snapshot.fetch_outcomes;
        self.expire_status();

        if !self.paused {
            self.snapshot = snapshot;
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
        self.status_set_at = Some(Instant::now());
    }

    fn expire_status(&mut self) {
        let done = match self.refresh_baseline {
            Some(baseline) => self.latest_fetch_outcomes > baseline,
            None => self
                .status_set_at
                .is_some_and(|at| at.elapsed() >= STATUS_MESSAGE_TTL),
        };

        if done {
            self.status_message = None;
            self.status_set_at = None;
            self.refresh_baseline = None;
        }
    }

    /// Handle a keyboard event, returning a command for the runtime if any
    pub fn handle_event(&mut self, event: DashboardEvent) -> Option<DashboardCommand> {
        match event {
            DashboardEvent::Quit => self.should_quit = true,
            DashboardEvent::ToggleHelp => self.show_help = !self.show_help,
            DashboardEvent::TogglePause => {
                self.paused = !self.paused;
                self.refresh_baseline = None;
                self.set_status(if self.paused {
                    "View paused, press p to resume"
                } else {
                    "View resumed"
                });
            }
            DashboardEvent::Refresh => {
                self.set_status("Refreshing alerts and distribution…");
                self.refresh_baseline = Some(self.latest_fetch_outcomes);
                return Some(DashboardCommand::Refresh);
            }
            DashboardEvent::None => {}
        }
        None
    }
}

/// Run the dashboard TUI until the user quits
pub fn run_dashboard_app(config: &Config) -> Result<()> {
    let live_url = config.live_url().context("Invalid live stream URL")?;

    // Start the backend side first so a bad config fails before raw mode
    let runtime = DashboardRuntime::start(config)?;
    let mut app = DashboardApp::new(config, live_url);

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_loop(&mut terminal, &mut app, &runtime, config.tick_rate());

    // Closes the live stream before the terminal is handed back
    runtime.shutdown();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

fn run_loop(
    terminal: &mut DashboardTerminal,
    app: &mut DashboardApp,
    runtime: &DashboardRuntime,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        app.update_snapshot(runtime.snapshot());
        terminal.draw(|frame| render_ui(frame, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("Event poll failed")? {
            if let Event::Key(key) = event::read().context("Event read failed")? {
                if key.kind == KeyEventKind::Press {
                    let dashboard_event = if app.show_help {
                        // Any key closes the help overlay
                        DashboardEvent::ToggleHelp
                    } else {
                        DashboardEvent::from_key(key.code)
                    };

                    if let Some(DashboardCommand::Refresh) = app.handle_event(dashboard_event) {
                        if !runtime.request_refresh() {
                            app.set_status("Refresh already pending");
                        }
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}
