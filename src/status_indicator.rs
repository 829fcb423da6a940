// src/status_indicator.rs

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// One-line status with a fetch spinner, rendered at the bottom of the
/// records screen.
#[derive(Debug)]
pub struct StatusIndicator {
    fetching: bool,
    status_text: String,
    spinner_idx: usize,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self {
            fetching: false,
            status_text: String::new(),
            spinner_idx: 0,
        }
    }

    pub fn set_fetching(&mut self, fetching: bool) {
        self.fetching = fetching;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status_text = status.into();
    }

    pub fn clear_status(&mut self) {
        self.status_text.clear();
    }

    pub fn update_spinner(&mut self) {
        self.spinner_idx = self.spinner_idx.wrapping_add(1);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let spinner_frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        let spinner = if self.fetching {
            spinner_frames[self.spinner_idx % spinner_frames.len()]
        } else {
            " "
        };

        let text = if !self.status_text.is_empty() {
            self.status_text.as_str()
        } else if self.fetching {
            "Fetching..."
        } else {
            ""
        };

        let color = if self.fetching {
            Color::DarkGray
        } else if !self.status_text.is_empty() {
            Color::Yellow
        } else {
            Color::DarkGray
        };

        let line = Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(text, Style::default().fg(color)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}
