// src/key_handlers.rs

use crate::app::{App, AppScreen, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_SCROLL: usize = 20;

/// Side effects the UI loop must perform after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    FetchSessions,
    FetchInitialPage,
    FetchNextPage,
}

pub fn handle_sessions_input(key: KeyEvent, app: &mut App) -> Option<UiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit_return_screen = AppScreen::Sessions;
        app.screen = AppScreen::QuitConfirm;
        return None;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next_session();
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev_session();
            None
        }
        KeyCode::Enter => {
            let name = app.selected_session_name()?.to_string();
            app.open_session(name);
            Some(UiAction::FetchInitialPage)
        }
        KeyCode::Char('r') => Some(UiAction::FetchSessions),
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit_return_screen = AppScreen::Sessions;
            app.screen = AppScreen::QuitConfirm;
            None
        }
        _ => None,
    }
}

pub fn handle_records_input(key: KeyEvent, app: &mut App) -> Option<UiAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit_return_screen = AppScreen::Records;
        app.screen = AppScreen::QuitConfirm;
        return None;
    }
    match app.input_mode {
        InputMode::Browse => handle_records_browse(key, app),
        InputMode::EditFilter => {
            handle_filter_edit(key, app);
            None
        }
    }
}

fn handle_records_browse(key: KeyEvent, app: &mut App) -> Option<UiAction> {
    match key.code {
        KeyCode::Esc => {
            // tearing the view down also invalidates in-flight fetches
            app.close_session();
            Some(UiAction::FetchSessions)
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_up(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_down(1);
            None
        }
        KeyCode::PageUp => {
            app.scroll_up(PAGE_SCROLL);
            None
        }
        KeyCode::PageDown => {
            app.scroll_down(PAGE_SCROLL);
            None
        }
        KeyCode::Home => {
            app.scroll_to_top();
            None
        }
        KeyCode::End => {
            app.scroll_to_bottom();
            None
        }
        KeyCode::Char('n') => {
            if app.fetch_in_flight {
                None
            } else {
                Some(UiAction::FetchNextPage)
            }
        }
        KeyCode::Char('f') => {
            app.follow = !app.follow;
            None
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::EditFilter;
            app.status.clear_status();
            None
        }
        KeyCode::Char('q') => {
            app.quit_return_screen = AppScreen::Records;
            app.screen = AppScreen::QuitConfirm;
            None
        }
        _ => None,
    }
}

fn handle_filter_edit(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter => match app.apply_filter_input() {
            Ok(()) => {
                app.input_mode = InputMode::Browse;
                app.status.clear_status();
                app.scroll_to_bottom();
            }
            Err(e) => {
                // previous filter stays active; show what was wrong
                app.input_mode = InputMode::Browse;
                app.status.set_status(format!("invalid filter: {}", e));
            }
        },
        KeyCode::Esc => {
            app.input_mode = InputMode::Browse;
        }
        KeyCode::Backspace => {
            app.filter_input.pop();
        }
        KeyCode::Char(c) => {
            app.filter_input.push(c);
        }
        _ => {}
    }
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.screen = AppScreen::Quit;
        }
        KeyCode::Char('n') | KeyCode::Esc => {
            app.screen = app.quit_return_screen;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionViewInfo;
    use chrono::{TimeZone, Utc};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_session() -> App {
        let mut app = App::new(100);
        app.set_sessions(vec![SessionViewInfo {
            name: "s1".to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2021, 5, 1, 10, 1, 0).unwrap(),
        }]);
        app
    }

    #[test]
    fn enter_opens_the_selected_session() {
        let mut app = app_with_session();
        let action = handle_sessions_input(key(KeyCode::Enter), &mut app);
        assert_eq!(action, Some(UiAction::FetchInitialPage));
        assert_eq!(app.screen, AppScreen::Records);
        assert_eq!(app.open_session.as_deref(), Some("s1"));
    }

    #[test]
    fn next_page_is_suppressed_while_a_fetch_is_in_flight() {
        let mut app = app_with_session();
        app.open_session("s1".to_string());
        app.fetch_in_flight = true;
        assert_eq!(handle_records_input(key(KeyCode::Char('n')), &mut app), None);
        app.fetch_in_flight = false;
        assert_eq!(
            handle_records_input(key(KeyCode::Char('n')), &mut app),
            Some(UiAction::FetchNextPage)
        );
    }

    #[test]
    fn esc_tears_down_and_returns_to_sessions() {
        let mut app = app_with_session();
        app.open_session("s1".to_string());
        let generation = app.fetch_generation;
        let action = handle_records_input(key(KeyCode::Esc), &mut app);
        assert_eq!(action, Some(UiAction::FetchSessions));
        assert_eq!(app.screen, AppScreen::Sessions);
        assert!(!app.is_current_fetch(generation));
    }

    #[test]
    fn declined_quit_returns_to_the_previous_screen() {
        let mut app = app_with_session();
        app.open_session("s1".to_string());
        handle_records_input(key(KeyCode::Char('q')), &mut app);
        assert_eq!(app.screen, AppScreen::QuitConfirm);
        handle_quit_confirm_input(key(KeyCode::Char('n')), &mut app);
        assert_eq!(app.screen, AppScreen::Records);
    }

    #[test]
    fn filter_edit_round_trip() {
        let mut app = app_with_session();
        app.open_session("s1".to_string());
        handle_records_input(key(KeyCode::Char('/')), &mut app);
        assert_eq!(app.input_mode, InputMode::EditFilter);
        for c in "net".chars() {
            handle_records_input(key(KeyCode::Char(c)), &mut app);
        }
        handle_records_input(key(KeyCode::Enter), &mut app);
        assert_eq!(app.input_mode, InputMode::Browse);
        assert_eq!(app.buffer.filter().unwrap().as_str(), "net");
    }
}
