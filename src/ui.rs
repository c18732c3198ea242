//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, List, ListItem, Padding, Paragraph, Row as TableRow, Table,
        TableState, Wrap,
    },
};
use std::{collections::BTreeMap, sync::LazyLock};

use log::Level;

use crate::app::{App, Page};
use crate::config::UiSettings;
use crate::listing::ListingSink;
use crate::logging::LogLine;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("pgup/pgdn", "page");
    map.insert("enter", "play selected");
    map.insert("space", "queue selected");
    map.insert("p", "play/pause");
    map.insert("b/f", "prev/next song");
    map.insert("F1/F2", "tracks/logs");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "gg/G", "pgup/pgdn", "enter", "space", "p", "b/f", "F1/F2", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Build the status line: row position, loading state and the last message.
fn status_text(app: &App) -> String {
    let total = app.listing.row_count();
    let mut parts: Vec<String> = Vec::new();

    if total == 0 {
        parts.push(" ROW: -/0".to_string());
    } else {
        parts.push(format!(" ROW: {}/{}", app.listing.cursor_position() + 1, total));
    }

    if app.loading {
        parts.push("LOADING".to_string());
    } else {
        parts.push("ALL LOADED".to_string());
    }

    if let Some(status) = &app.status {
        parts.push(status.clone());
    }

    parts.join(" • ")
}

fn level_color(level: Level) -> Color {
    match level {
        Level::Error => Color::Red,
        Level::Warn => Color::Yellow,
        Level::Info => Color::Green,
        Level::Debug => Color::Blue,
        Level::Trace => Color::DarkGray,
    }
}

fn log_item(line: &LogLine, color: bool) -> ListItem<'static> {
    let level = format!("{:<5}", line.level);
    let level = if color {
        Span::styled(level, Style::default().fg(level_color(line.level)))
    } else {
        Span::raw(level)
    };
    ListItem::new(Line::from(vec![
        level,
        Span::raw(format!(" {}: {}", line.target, line.message)),
    ]))
}

fn padded_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn draw_listing(frame: &mut Frame, app: &App, area: Rect) {
    // Borders and the column header take three lines.
    let height = area.height.saturating_sub(3) as usize;
    let window = app.listing.window(height);

    let rows: Vec<TableRow> = window
        .rows
        .iter()
        .map(|row| TableRow::new(row.columns.iter().map(|c| Cell::from(c.clone()))))
        .collect();

    let header = TableRow::new(["Name", "Artist", "Album", "Duration"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" tracks "))
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(window.selected);
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_logs(frame: &mut Frame, app: &App, area: Rect, color: bool) {
    let height = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = match &app.logs {
        Some(logs) => logs.tail(height).iter().map(|l| log_item(l, color)).collect(),
        None => vec![ListItem::new("logs are written to stderr")],
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" logs "));
    frame.render_widget(list, area);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, color: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());
    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" nspotify ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app))
        .block(padded_block(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    match app.page {
        Page::Listing => draw_listing(frame, app, chunks[2]),
        Page::Logs => draw_logs(frame, app, chunks[2], color),
    }

    let footer = Paragraph::new(controls_text())
        .block(padded_block(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::library::{Track, TrackUri};
    use crate::listing::{Listing, ListingSink, Row};
    use crate::logging::LogBuffer;

    fn app_with(n: usize) -> App {
        let listing = Listing::new();
        for i in 0..n {
            listing.append_row(Row::from_track(&Track {
                uri: TrackUri::new(format!("spotify:track:id{i}")),
                name: format!("Song {i}"),
                artists: vec!["Band".into()],
                album: "Record".into(),
                duration_ms: 61_000,
            }));
        }
        App::new(listing)
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| draw(f, app, &UiSettings::default(), true))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn controls_text_lists_every_binding_in_order() {
        let text = controls_text();
        assert!(text.starts_with("[j/k] up/down | [gg/G] top/bottom"));
        assert!(text.ends_with("[q] quit"));
        assert_eq!(text.matches(" | ").count(), 8);
    }

    #[test]
    fn status_reports_position_and_loading() {
        let mut app = app_with(3);
        app.next();
        assert_eq!(status_text(&app), " ROW: 2/3 • LOADING");

        app.finish_loading();
        app.set_status("queued Song 1");
        assert_eq!(status_text(&app), " ROW: 2/3 • ALL LOADED • queued Song 1");

        assert_eq!(status_text(&app_with(0)), " ROW: -/0 • LOADING");
    }

    #[test]
    fn listing_page_shows_header_and_rows() {
        let screen = render(&app_with(5));
        assert!(screen.contains("Duration"));
        assert!(screen.contains("Song 0"));
        assert!(screen.contains("Song 4"));
        assert!(screen.contains("1:01"));
    }

    #[test]
    fn logs_page_shows_buffered_lines() {
        let mut app = app_with(1);
        let logs = Arc::new(LogBuffer::new(10, log::LevelFilter::Trace));
        logs.push(LogLine {
            level: Level::Error,
            target: "nspotify".into(),
            message: "request to pause failed".into(),
        });
        app.set_logs(logs);
        app.show_page(Page::Logs);

        let screen = render(&app);
        assert!(screen.contains("request to pause failed"));
        assert!(!screen.contains("Song 0"));
    }
}
