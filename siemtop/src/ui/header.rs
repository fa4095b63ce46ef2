//! Top header with server, active screen and refresh indicator.

use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::nav::Route;

pub fn draw_header(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    server: &str,
    route: Route,
    last_refresh: Option<DateTime<Local>>,
    busy: bool,
) {
    let tab = |label: &'static str, r: Route| {
        if r == route {
            Span::styled(
                format!(" {label} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw(format!(" {label} "))
        }
    };

    let refresh = match last_refresh {
        Some(t) => format!("updated {}", t.format("%H:%M")),
        None => "not updated yet".into(),
    };
    let spinner = if busy { " ⟳" } else { "" };

    let line = Line::from(vec![
        Span::styled("siemtop", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" — {server} | ")),
        tab("Dashboard", Route::Dashboard),
        tab("Events", Route::Events),
        Span::raw(format!(" | {refresh}{spinner}  (Tab switch, L logout, q quit)")),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}
