//! Events screen: filter bar, events table and pagination line.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};

use crate::events::{EventsState, TableView};
use crate::ui::theme;
use crate::ui::util::contains;

// Column widths shared by drawing and row hit-testing.
const COLS: [Constraint; 6] = [
    Constraint::Length(19), // time
    Constraint::Length(18), // agent
    Constraint::Length(20), // type
    Constraint::Length(9),  // severity
    Constraint::Length(14), // user
    Constraint::Min(20),    // message
];

/// Areas from the last draw, for mouse hit-testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventsLayout {
    pub table: Rect,
    pub prev: Rect,
    pub next: Rect,
}

pub fn draw_events(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &EventsState,
    table_state: &mut TableState,
    search_focused: bool,
) -> EventsLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    draw_filter_bar(f, rows[0], state, search_focused);
    draw_table(f, rows[1], state, table_state);
    let (prev, next) = draw_pagination(f, rows[2], state);
    EventsLayout {
        table: rows[1],
        prev,
        next,
    }
}

fn draw_filter_bar(f: &mut ratatui::Frame<'_>, area: Rect, state: &EventsState, focused: bool) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),
            Constraint::Length(20),
            Constraint::Length(28),
            Constraint::Length(16),
        ])
        .split(area);

    let filter = state.filter();
    let border = |on: bool| {
        Style::default().fg(if on { Color::Cyan } else { theme::BORDER })
    };

    let search_text = if filter.search.is_empty() && !focused {
        Span::styled("press / to search", Style::default().fg(theme::MUTED))
    } else {
        Span::raw(format!("{}{}", filter.search, if focused { "▏" } else { "" }))
    };
    f.render_widget(
        Paragraph::new(search_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(focused))
                .title("Search (message / raw log)"),
        ),
        cols[0],
    );

    let severity = if filter.severity.is_empty() {
        Span::raw("All")
    } else {
        Span::styled(
            filter.severity.to_uppercase(),
            Style::default().fg(theme::severity_str_color(&filter.severity)),
        )
    };
    f.render_widget(
        Paragraph::new(severity).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(!filter.severity.is_empty()))
                .title("Severity [s]"),
        ),
        cols[1],
    );

    let known = state.type_options().count();
    let type_text = if filter.event_type.is_empty() {
        format!("All ({known} known)")
    } else {
        filter.event_type.clone()
    };
    f.render_widget(
        Paragraph::new(type_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(!filter.event_type.is_empty()))
                .title("Type [t]"),
        ),
        cols[2],
    );

    f.render_widget(
        Paragraph::new(state.total_label())
            .block(Block::default().borders(Borders::ALL).border_style(border(false))),
        cols[3],
    );
}

fn header_row() -> Row<'static> {
    Row::new(vec!["Time", "Agent", "Type", "Severity", "User", "Message"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

fn single_row(text: &'static str, color: Color) -> Row<'static> {
    Row::new(vec![Cell::from(Span::styled(text, Style::default().fg(color)))])
}

fn draw_table(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &EventsState,
    table_state: &mut TableState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title("Events (↑/↓ select, Enter details, ←/→ page)");

    let (rows, selectable): (Vec<Row>, bool) = match state.table() {
        TableView::Loading => (vec![single_row("Loading...", theme::MUTED)], false),
        TableView::NoData => (vec![single_row("No events to display", theme::MUTED)], false),
        TableView::Error => (vec![single_row("Failed to load data", theme::DANGER)], false),
        TableView::Rows(rows) => (
            rows.into_iter()
                .map(|r| {
                    let sev_color = theme::severity_str_color(&r.severity);
                    Row::new(vec![
                        Cell::from(r.timestamp).style(Style::default().fg(theme::MUTED)),
                        Cell::from(r.agent_id),
                        Cell::from(r.event_type),
                        Cell::from(r.severity.to_uppercase()).style(
                            Style::default().fg(sev_color).add_modifier(Modifier::BOLD),
                        ),
                        Cell::from(r.user),
                        Cell::from(r.message),
                    ])
                })
                .collect(),
            true,
        ),
    };

    // Placeholder rows span the whole width; give them a single full-width column.
    let table = if selectable {
        table_state.select(Some(state.selected()));
        Table::new(rows, COLS)
    } else {
        table_state.select(None);
        Table::new(rows, [Constraint::Percentage(100)])
    };
    let table = table
        .header(header_row())
        .block(block)
        .column_spacing(1)
        .highlight_style(Style::default().bg(theme::HIGHLIGHT_BG).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");
    f.render_stateful_widget(table, area, table_state);
}

// Returns the prev/next hit areas.
fn draw_pagination(f: &mut ratatui::Frame<'_>, area: Rect, state: &EventsState) -> (Rect, Rect) {
    let p = state.pagination();
    let button = |label: &'static str, enabled: bool| {
        let style = if enabled {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::BORDER)
        };
        Span::styled(label, style)
    };
    let prev_label = "[◀ Prev]";
    let next_label = "[Next ▶]";
    let middle = format!("  page {}/{}  ", p.page, p.total_pages);
    let line = Line::from(vec![
        button(prev_label, p.prev_enabled),
        Span::raw(middle.clone()),
        button(next_label, p.next_enabled),
        Span::styled(format!("   {}", p.label()), Style::default().fg(theme::MUTED)),
    ]);
    f.render_widget(Paragraph::new(line), area);

    let prev_w = prev_label.chars().count() as u16;
    let next_x = area.x + prev_w + middle.chars().count() as u16;
    let prev = Rect { width: prev_w.min(area.width), height: 1, ..area };
    let next = Rect {
        x: next_x,
        width: (next_label.chars().count() as u16).min(area.width.saturating_sub(next_x - area.x)),
        height: 1,
        ..area
    };
    (prev, next)
}

/// Row index under a mouse click on the table, accounting for border, header and
/// scroll offset.
pub fn row_at(table_area: Rect, offset: usize, column: u16, row: u16) -> Option<usize> {
    let first_row_y = table_area.y + 2; // border + header
    let last_y = table_area.y + table_area.height.saturating_sub(1);
    if column <= table_area.x || column >= table_area.x + table_area.width.saturating_sub(1) {
        return None;
    }
    if row < first_row_y || row >= last_y {
        return None;
    }
    Some(offset + (row - first_row_y) as usize)
}

/// Follow-ups that need the API client, so the caller runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventsAction {
    None,
    Reload,
    PrevPage,
    NextPage,
}

/// Keys for the events screen. An open detail modal takes every key, then a focused
/// search box; otherwise the table bindings apply.
pub fn events_handle_key(
    state: &mut EventsState,
    search_focused: &mut bool,
    key: KeyEvent,
    now: Instant,
) -> EventsAction {
    if state.detail().is_some() {
        match key.code {
            KeyCode::Esc | KeyCode::Char('x') | KeyCode::Char('q') => state.close_detail(),
            KeyCode::Up => state.scroll_detail(-1),
            KeyCode::Down => state.scroll_detail(1),
            KeyCode::PageUp => state.scroll_detail(-10),
            KeyCode::PageDown => state.scroll_detail(10),
            _ => {}
        }
        return EventsAction::None;
    }

    if *search_focused {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => *search_focused = false,
            KeyCode::Backspace => state.pop_search_char(now),
            KeyCode::Char(c) => state.push_search_char(c, now),
            _ => {}
        }
        return EventsAction::None;
    }

    match key.code {
        KeyCode::Char('/') => *search_focused = true,
        KeyCode::Char('s') => state.cycle_severity(),
        KeyCode::Char('t') => state.cycle_event_type(),
        KeyCode::Char('c') => state.clear_filters(),
        KeyCode::Char('r') => return EventsAction::Reload,
        KeyCode::Left | KeyCode::PageUp => return EventsAction::PrevPage,
        KeyCode::Right | KeyCode::PageDown => return EventsAction::NextPage,
        KeyCode::Up => state.select_prev(),
        KeyCode::Down => state.select_next(),
        KeyCode::Home => state.select(0),
        KeyCode::End => state.select(usize::MAX),
        KeyCode::Enter => {
            state.open_selected();
        }
        _ => {}
    }
    EventsAction::None
}

/// Mouse on the events screen. While the detail modal is open, a left click outside
/// `detail_area` closes it and the wheel scrolls it.
pub fn events_handle_mouse(
    state: &mut EventsState,
    layout: &EventsLayout,
    table_offset: usize,
    detail_area: Option<Rect>,
    m: MouseEvent,
) -> EventsAction {
    let (col, row) = (m.column, m.row);

    if state.detail().is_some() {
        match m.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if detail_area.is_some_and(|area| !contains(area, col, row)) {
                    state.close_detail();
                }
            }
            MouseEventKind::ScrollUp => state.scroll_detail(-1),
            MouseEventKind::ScrollDown => state.scroll_detail(1),
            _ => {}
        }
        return EventsAction::None;
    }

    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if contains(layout.prev, col, row) {
                return EventsAction::PrevPage;
            }
            if contains(layout.next, col, row) {
                return EventsAction::NextPage;
            }
            if let Some(i) = row_at(layout.table, table_offset, col, row) {
                state.open_detail(i);
            }
        }
        MouseEventKind::ScrollUp if contains(layout.table, col, row) => state.select_prev(),
        MouseEventKind::ScrollDown if contains(layout.table, col, row) => state.select_next(),
        _ => {}
    }
    EventsAction::None
}
