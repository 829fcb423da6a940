// src/record_view.rs

use crate::app::InputMode;
use crate::models::{LogLevel, LogRecord};
use crate::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Trace => Color::DarkGray,
        LogLevel::Debug => Color::Cyan,
        LogLevel::Info => Color::Green,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Error => Color::Red,
    }
}

/// Cuts `text` down to at most `max_width` terminal columns.
fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            out.push('…');
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}

fn record_line(record: &LogRecord, width: usize) -> Line<'static> {
    let body = &record.record;
    let head = format!(
        "{:>8} {:<5} {:>9.3}s {:<18} ",
        record.id,
        body.level.to_string(),
        body.elapsed,
        truncate_to_width(&body.category, 18),
    );
    let remaining = width.saturating_sub(head.chars().count());
    let message = truncate_to_width(&body.message, remaining);
    Line::from(vec![
        Span::styled(head, Style::default().fg(level_color(body.level))),
        Span::styled(message, Style::default().fg(Color::White)),
    ])
}

/// Draws the record table for the open session: header with counts and
/// the active filter, the visible rows, and the filter/status footer.
pub fn draw_records(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    draw_header(f, app, chunks[0]);
    draw_rows(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    let hints = match app.input_mode {
        InputMode::Browse => {
            "↑/↓ scroll  n next page  f follow  / filter  Esc back  q quit"
        }
        InputMode::EditFilter => "Enter apply  Esc cancel (empty clears)",
    };
    let hints_para = Paragraph::new(hints).style(Style::default().fg(Color::DarkGray));
    f.render_widget(hints_para, chunks[3]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let name = app.open_session.as_deref().unwrap_or("?");
    let visible = app.buffer.current_view().len();
    let total = app.buffer.len();
    let filter = match app.buffer.filter() {
        Some(p) => format!("  filter: /{}/", p.as_str()),
        None => String::new(),
    };
    let follow = if app.follow { "  [follow]" } else { "" };
    let header_text = format!(
        "{}  {} of {} records{}{}",
        name, visible, total, filter, follow
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn draw_rows(f: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .title(" records ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let view = app.buffer.current_view();
    let height = inner.height as usize;
    if height == 0 || view.is_empty() {
        return;
    }

    // Pin to the tail in follow mode, otherwise show the window the
    // user scrolled to.
    let max_first = view.len().saturating_sub(height);
    let first = if app.follow {
        max_first
    } else {
        app.scroll.min(max_first)
    };

    let lines: Vec<Line> = view
        .iter()
        .skip(first)
        .take(height)
        .map(|record| record_line(record, inner.width as usize))
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    match app.input_mode {
        InputMode::EditFilter => {
            let input = Paragraph::new(app.filter_input.as_str())
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL).title(" filter "));
            f.render_widget(input, area);
            f.set_cursor_position((
                area.x + app.filter_input.chars().count() as u16 + 1,
                area.y + 1,
            ));
        }
        InputMode::Browse => {
            let block = Block::default().borders(Borders::ALL).title(" status ");
            let inner = block.inner(area);
            f.render_widget(block, area);
            app.status.render(f, inner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_column_width() {
        assert_eq!(truncate_to_width("hello", 10), "hello");
        assert_eq!(truncate_to_width("hello world", 5), "hello…");
        // double-width characters count as two columns
        assert_eq!(truncate_to_width("ねこねこ", 4), "ねこ…");
    }

    #[test]
    fn level_colors_distinguish_severities() {
        assert_ne!(level_color(LogLevel::Info), level_color(LogLevel::Error));
        assert_eq!(level_color(LogLevel::Warn), Color::Yellow);
    }
}
