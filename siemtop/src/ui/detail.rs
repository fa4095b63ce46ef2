//! Event detail modal: the raw record as syntax-coloured JSON.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::events::DetailView;
use crate::ui::theme;
use crate::ui::util::centered;

/// Draws the modal and returns its area, so clicks outside it can close it.
pub fn draw_detail(f: &mut ratatui::Frame<'_>, area: Rect, detail: &DetailView) -> Rect {
    let popup = centered(area, 80, 80);
    f.render_widget(Clear, popup);

    let lines: Vec<Line> = detail
        .lines
        .iter()
        .map(|tokens| {
            Line::from(
                tokens
                    .iter()
                    .map(|t| {
                        Span::styled(
                            t.text.clone(),
                            Style::default().fg(theme::token_color(t.kind)),
                        )
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!("{}  [x/Esc close, ↑/↓ scroll]", detail.title));
    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .scroll((detail.scroll, 0)),
        popup,
    );
    popup
}
