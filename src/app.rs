// src/app.rs

use crate::log_buffer::LogBuffer;
use crate::models::SessionViewInfo;
use crate::status_indicator::StatusIndicator;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Sessions,
    Records,
    QuitConfirm,
    Quit,
}

/// Input handling mode on the records screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    EditFilter,
}

pub struct App {
    pub screen: AppScreen,
    pub sessions: Vec<SessionViewInfo>,
    pub selected_session: usize,
    /// Name of the session whose buffer is currently live.
    pub open_session: Option<String>,
    pub buffer: LogBuffer,
    pub input_mode: InputMode,
    pub filter_input: String,
    /// Top row of the visible window into the record view.
    pub scroll: usize,
    /// Keep the view pinned to the newest records.
    pub follow: bool,
    /// Bumped whenever the record view opens or closes; fetch results
    /// carrying an older generation are dropped whole.
    pub fetch_generation: u64,
    pub fetch_in_flight: bool,
    pub page_length: usize,
    pub status: StatusIndicator,
    /// Where to land when a quit confirmation is declined.
    pub quit_return_screen: AppScreen,
    /// Last session-list fetch failure, shown on the sessions screen.
    pub session_error: Option<String>,
}

impl App {
    pub fn new(page_length: usize) -> App {
        App {
            screen: AppScreen::Sessions,
            sessions: Vec::new(),
            selected_session: 0,
            open_session: None,
            buffer: LogBuffer::new(),
            input_mode: InputMode::Browse,
            filter_input: String::new(),
            scroll: 0,
            follow: true,
            fetch_generation: 0,
            fetch_in_flight: false,
            page_length,
            status: StatusIndicator::new(),
            quit_return_screen: AppScreen::Sessions,
            session_error: None,
        }
    }

    pub fn set_sessions(&mut self, mut sessions: Vec<SessionViewInfo>) {
        // newest activity first
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        self.sessions = sessions;
        if self.selected_session >= self.sessions.len() {
            self.selected_session = self.sessions.len().saturating_sub(1);
        }
    }

    pub fn select_next_session(&mut self) {
        if !self.sessions.is_empty() {
            self.selected_session = (self.selected_session + 1) % self.sessions.len();
        }
    }

    pub fn select_prev_session(&mut self) {
        if !self.sessions.is_empty() {
            if self.selected_session == 0 {
                self.selected_session = self.sessions.len() - 1;
            } else {
                self.selected_session -= 1;
            }
        }
    }

    pub fn selected_session_name(&self) -> Option<&str> {
        self.sessions
            .get(self.selected_session)
            .map(|s| s.name.as_str())
    }

    /// Opens the record view with a fresh buffer for `name`.
    pub fn open_session(&mut self, name: String) {
        self.fetch_generation += 1;
        self.fetch_in_flight = false;
        self.buffer = LogBuffer::new();
        self.open_session = Some(name);
        self.screen = AppScreen::Records;
        self.input_mode = InputMode::Browse;
        self.filter_input.clear();
        self.scroll = 0;
        self.follow = true;
        self.status.clear_status();
    }

    /// Tears the record view down; any in-flight fetch result for it
    /// will arrive with a stale generation and be discarded.
    pub fn close_session(&mut self) {
        self.fetch_generation += 1;
        self.fetch_in_flight = false;
        self.open_session = None;
        self.buffer = LogBuffer::new();
        self.screen = AppScreen::Sessions;
        self.input_mode = InputMode::Browse;
        self.status.clear_status();
    }

    pub fn is_current_fetch(&self, generation: u64) -> bool {
        generation == self.fetch_generation
    }

    /// Compiles the filter input and applies it to the buffer. A syntax
    /// error is returned to the caller and the previous filter stays
    /// active; an empty input clears the filter.
    pub fn apply_filter_input(&mut self) -> Result<(), regex::Error> {
        let trimmed = self.filter_input.trim();
        if trimmed.is_empty() {
            self.buffer.set_filter(None);
            return Ok(());
        }
        let pattern = Regex::new(trimmed)?;
        self.buffer.set_filter(Some(pattern));
        Ok(())
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = false;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.buffer.current_view().len().saturating_sub(1);
        self.scroll = (self.scroll + lines).min(max);
        if self.scroll == max {
            self.follow = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.follow = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.buffer.current_view().len().saturating_sub(1);
        self.follow = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogLevel, LogRecord, RecordBody, SessionViewInfo};
    use chrono::{TimeZone, Utc};

    fn session(name: &str, updated_min: u32) -> SessionViewInfo {
        SessionViewInfo {
            name: name.to_string(),
            created_at: Utc.with_ymd_and_hms(2021, 5, 1, 10, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2021, 5, 1, 10, updated_min, 0).unwrap(),
        }
    }

    fn record(id: u64, category: &str, message: &str) -> LogRecord {
        LogRecord {
            id,
            record: RecordBody {
                level: LogLevel::Info,
                elapsed: 0.0,
                category: category.to_string(),
                message: message.to_string(),
                module_path: None,
                file: None,
                line: None,
                kv: None,
            },
        }
    }

    #[test]
    fn sessions_sort_newest_first() {
        let mut app = App::new(100);
        app.set_sessions(vec![session("old", 1), session("new", 30), session("mid", 10)]);
        let names: Vec<_> = app.sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["new", "mid", "old"]);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut app = App::new(100);
        app.set_sessions(vec![session("a", 1), session("b", 2)]);
        assert_eq!(app.selected_session, 0);
        app.select_prev_session();
        assert_eq!(app.selected_session, 1);
        app.select_next_session();
        assert_eq!(app.selected_session, 0);
    }

    #[test]
    fn stale_fetches_are_not_current() {
        let mut app = App::new(100);
        app.open_session("a".to_string());
        let generation = app.fetch_generation;
        assert!(app.is_current_fetch(generation));
        app.close_session();
        assert!(!app.is_current_fetch(generation));
    }

    #[test]
    fn bad_filter_keeps_previous_pattern() {
        let mut app = App::new(100);
        app.buffer.replace(vec![record(1, "net", "start")]);

        app.filter_input = "net".to_string();
        app.apply_filter_input().unwrap();
        assert_eq!(app.buffer.current_view().len(), 1);

        app.filter_input = "(unclosed".to_string();
        assert!(app.apply_filter_input().is_err());
        // previous filter still active
        assert!(app.buffer.filter().is_some());
        assert_eq!(app.buffer.filter().unwrap().as_str(), "net");
    }

    #[test]
    fn empty_filter_input_clears_the_filter() {
        let mut app = App::new(100);
        app.buffer.replace(vec![record(1, "net", "start")]);
        app.filter_input = "net".to_string();
        app.apply_filter_input().unwrap();
        app.filter_input = "  ".to_string();
        app.apply_filter_input().unwrap();
        assert!(app.buffer.filter().is_none());
    }

    #[test]
    fn scroll_clamps_to_view() {
        let mut app = App::new(100);
        app.buffer
            .replace((0..5).map(|i| record(i, "a", "x")).collect());
        app.scroll_down(10);
        assert_eq!(app.scroll, 4);
        assert!(app.follow);
        app.scroll_up(2);
        assert_eq!(app.scroll, 2);
        assert!(!app.follow);
        app.scroll_up(10);
        assert_eq!(app.scroll, 0);
    }
}
