// src/main.rs
use std::error::Error;
use std::fs::OpenOptions;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent, KeyEventKind};
use crossterm::{execute, terminal::{EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter, prelude::*, Registry};

mod ack;
mod app;
mod catalog;
mod clipboard;
mod clock;
mod config;
mod countdown;
mod model;
mod otp;
mod presentation;
mod ui;

use app::App;
use clipboard::SystemClipboard;
use clock::SystemClock;
use config::Config;
use model::AppEvent;
use ui::draw_ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::load();

    // initialize tracing to file only when --debug is passed
    if config.debug {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        let filter = EnvFilter::try_new(&config.log_filter)?;
        let fmt_layer = fmt::layer()
            .with_writer(move || file.try_clone().expect("log file clone"))
            .with_target(false);
        Registry::default().with(filter).with(fmt_layer).init();
        info!("Tracing initialized to {} ({})", config.log_file.display(), config.log_filter);
    }

    info!("Starting ShareKey TUI");

    let mut app = App::new(SystemClock, Box::new(SystemClipboard::new()));

    // Terminal setup
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    crossterm::terminal::enable_raw_mode()?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Channel for background tasks -> UI
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    catalog::spawn_load(config.accounts_path.clone(), tx.clone());

    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        // timers first, so the frame drawn below reflects this instant
        app.presentation.tick();

        if last_tick.elapsed() >= tick_rate {
            if app.loading {
                app.throbber_state.calc_next();
            }
            terminal.draw(|f| draw_ui(f, &mut app)).ok();
            last_tick = Instant::now();
        }

        // Drain background events
        while let Ok(ev) = rx.try_recv() {
            match ev {
                AppEvent::AccountsLoaded(accounts) => app.accounts_loaded(accounts),
                AppEvent::Message(msg) => {
                    warn!("Background message: {}", msg);
                    app.loading = false;
                    app.message = Some(msg);
                }
            }
        }

        // Input handling
        if event::poll(Duration::from_millis(20))? {
            if let CEvent::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = event::read()? {
                if app.handle_key(code) {
                    break;
                }
            }
        }
    }

    // surface must be gone before the terminal is
    app.presentation.close_presentation();

    // Cleanup
    crossterm::terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("Exiting ShareKey TUI");
    Ok(())
}
