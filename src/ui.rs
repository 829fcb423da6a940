// src/ui.rs

use crate::{
    api::ApiClient,
    app::{App, AppScreen},
    errors::LoupeResult,
    key_handlers::{
        handle_quit_confirm_input, handle_records_input, handle_sessions_input, UiAction,
    },
    models::{LogRecord, SessionViewInfo},
    record_view::draw_records,
    session_view::{draw_quit_confirm, draw_sessions},
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    io,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

/// Follow mode fetches the next page every this many ticks.
const FOLLOW_FETCH_EVERY_TICKS: u64 = 8;

enum Event {
    Input(CEvent),
    Tick,
    Fetch(FetchEvent),
}

/// Result of a spawned gateway fetch, delivered to the UI loop.
enum FetchEvent {
    Sessions(LoupeResult<Vec<SessionViewInfo>>),
    Page {
        generation: u64,
        initial: bool,
        result: LoupeResult<Vec<LogRecord>>,
    },
}

/// Runs the terminal UI until the user quits.
pub async fn run_ui(api: ApiClient, app: App) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, api, app).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Main loop of the application.
async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    api: ApiClient,
    mut app: App,
) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // Input reader: polls crossterm and emits a tick every 250ms.
    let input_tx = tx.clone();
    tokio::spawn(async move {
        let mut last_tick = Instant::now();
        loop {
            let timeout = Duration::from_millis(100);
            if event::poll(timeout).unwrap_or(false) {
                if let Ok(event) = event::read() {
                    if input_tx.send(Event::Input(event)).await.is_err() {
                        return;
                    }
                }
            }
            if last_tick.elapsed() >= Duration::from_millis(250) {
                if input_tx.send(Event::Tick).await.is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });

    // The session list is the first thing on screen.
    spawn_sessions_fetch(&api, &tx);

    let mut tick_count: u64 = 0;
    loop {
        terminal.draw(|f| ui(f, &mut app))?;

        match rx.recv().await {
            Some(Event::Input(CEvent::Key(key))) => {
                let action = match app.screen {
                    AppScreen::Sessions => handle_sessions_input(key, &mut app),
                    AppScreen::Records => handle_records_input(key, &mut app),
                    AppScreen::QuitConfirm => {
                        handle_quit_confirm_input(key, &mut app);
                        None
                    }
                    AppScreen::Quit => None,
                };
                if let Some(action) = action {
                    perform_action(action, &mut app, &api, &tx);
                }
            }
            Some(Event::Input(_)) => {}
            Some(Event::Tick) => {
                tick_count += 1;
                app.status.update_spinner();
                // Follow mode keeps pulling new pages on a slow cadence.
                if app.screen == AppScreen::Records
                    && app.follow
                    && !app.fetch_in_flight
                    && !app.buffer.is_empty()
                    && tick_count % FOLLOW_FETCH_EVERY_TICKS == 0
                {
                    perform_action(UiAction::FetchNextPage, &mut app, &api, &tx);
                }
            }
            Some(Event::Fetch(fetch)) => apply_fetch(fetch, &mut app),
            None => break,
        }

        if app.screen == AppScreen::Quit {
            break;
        }
    }

    Ok(())
}

/// Renders the current screen.
fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        AppScreen::Sessions => draw_sessions(f, app),
        AppScreen::Records => draw_records(f, app),
        AppScreen::QuitConfirm => {
            match app.quit_return_screen {
                AppScreen::Records => draw_records(f, app),
                _ => draw_sessions(f, app),
            }
            draw_quit_confirm(f);
        }
        AppScreen::Quit => {}
    }
}

fn perform_action(action: UiAction, app: &mut App, api: &ApiClient, tx: &mpsc::Sender<Event>) {
    match action {
        UiAction::FetchSessions => spawn_sessions_fetch(api, tx),
        UiAction::FetchInitialPage => spawn_page_fetch(app, api, tx, 0, true),
        UiAction::FetchNextPage => {
            // before the first page lands this is still an initial load
            match app.buffer.highest_known_id() {
                Ok(id) => spawn_page_fetch(app, api, tx, id + 1, false),
                Err(_) => spawn_page_fetch(app, api, tx, 0, true),
            }
        }
    }
}

fn spawn_sessions_fetch(api: &ApiClient, tx: &mpsc::Sender<Event>) {
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api.storages().await;
        let _ = tx.send(Event::Fetch(FetchEvent::Sessions(result))).await;
    });
}

fn spawn_page_fetch(
    app: &mut App,
    api: &ApiClient,
    tx: &mpsc::Sender<Event>,
    start: u64,
    initial: bool,
) {
    let Some(name) = app.open_session.clone() else {
        return;
    };
    app.fetch_in_flight = true;
    app.status.set_fetching(true);

    let generation = app.fetch_generation;
    let length = app.page_length;
    let api = api.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = api.storage_read_at(&name, start, length).await;
        let _ = tx
            .send(Event::Fetch(FetchEvent::Page {
                generation,
                initial,
                result,
            }))
            .await;
    });
}

/// Applies a fetch result to the app state, or drops it whole when the
/// view it belongs to has been torn down in the meantime.
fn apply_fetch(fetch: FetchEvent, app: &mut App) {
    match fetch {
        FetchEvent::Sessions(Ok(sessions)) => {
            log::debug!("loaded {} sessions", sessions.len());
            app.session_error = None;
            app.set_sessions(sessions);
        }
        FetchEvent::Sessions(Err(e)) => {
            log::error!("session list fetch failed: {}", e);
            app.session_error = Some(e.to_string());
        }
        FetchEvent::Page {
            generation,
            initial,
            result,
        } => {
            if !app.is_current_fetch(generation) {
                log::debug!("dropping stale fetch result (generation {})", generation);
                return;
            }
            app.fetch_in_flight = false;
            app.status.set_fetching(false);
            match result {
                Ok(records) => {
                    log::debug!("applying page of {} records", records.len());
                    if initial {
                        app.buffer.replace(records);
                    } else {
                        app.buffer.append(records);
                    }
                    if app.follow {
                        app.scroll_to_bottom();
                    }
                }
                Err(e) => {
                    log::error!("record fetch failed: {}", e);
                    app.status.set_status(format!("fetch failed: {}", e));
                }
            }
        }
    }
}
