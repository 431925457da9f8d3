//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching business logic.
//!
//! ## For contributors
//!
//! * The layout is a two-row split: a scrollable list on top and a one-line
//!   status bar at the bottom.
//! * Rows are drawn in the order the engine ingested them; the list never
//!   re-sorts, so a row's index is stable while the viewer is open.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use feedwatch::EngineState;

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Render the scrollable item list: title, then link.
fn draw_feed_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .items
        .iter()
        .map(|item| {
            let line = Line::from(vec![
                Span::styled(&item.title, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(&item.link, Style::default().fg(Color::DarkGray)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Feeds ")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let state = match app.engine_state {
        EngineState::Empty => "waiting",
        EngineState::Polling => "polling",
        EngineState::Idle => "idle",
    };
    let updated = app
        .last_update
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".into());

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} items", app.items.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{state}, updated {updated}]"),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  r: refresh  x: reset"),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
