// src/session_view.rs

use crate::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draws the session list: one row per storage with its creation and
/// last-update timestamps, newest activity on top.
pub fn draw_sessions(f: &mut Frame, app: &App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new("loupe - recorded logging sessions")
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let mut lines = Vec::new();
    if let Some(err) = &app.session_error {
        lines.push(Line::from(Span::styled(
            format!("✗ {}", err),
            Style::default().fg(Color::Red),
        )));
    }
    if app.sessions.is_empty() {
        lines.push(Line::from(Span::styled(
            "no sessions found (press r to refresh)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for (i, session) in app.sessions.iter().enumerate() {
        let selected = i == app.selected_session;
        let style = if selected {
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let line_str = format!(
            "{} {:<38} created {}  updated {}",
            if selected { "▶" } else { " " },
            session.name,
            session.created_at.format("%Y-%m-%d %H:%M:%S"),
            session.updated_at.format("%Y-%m-%d %H:%M:%S"),
        );
        lines.push(Line::from(Span::styled(line_str, style)));
    }

    let list = Paragraph::new(lines).block(
        Block::default()
            .title(" sessions ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(list, chunks[1]);

    let hints = Paragraph::new("↑/↓ select  Enter open  r refresh  q quit")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hints, chunks[2]);
}

/// Draws the quit confirmation overlay line.
pub fn draw_quit_confirm(f: &mut Frame) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let prompt = Paragraph::new("quit loupe? (y/n)")
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(prompt, chunks[1]);
}
