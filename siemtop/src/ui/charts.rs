//! Chart widgets for dashboard chart slots: bar, horizontal bar, share bars and a line.

use ratatui::{
    layout::{Alignment, Direction, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart as LineChart, Dataset, GraphType,
        Paragraph,
    },
};

use crate::dashboard::{Chart, ChartKind, ChartSlot};
use crate::ui::theme;
use crate::ui::util::{inner, truncate_end};

pub fn draw_chart_slot(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, slot: &ChartSlot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(title.to_string());

    let Some(chart) = slot.visible() else {
        let text = slot.placeholder().unwrap_or("Loading...");
        f.render_widget(block, area);
        let body = inner(area);
        if body.height == 0 {
            return;
        }
        let centered_row = Rect {
            y: body.y + body.height / 2,
            height: 1,
            ..body
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, Style::default().fg(theme::MUTED)))
                .alignment(Alignment::Center),
            centered_row,
        );
        return;
    };

    match chart.kind {
        ChartKind::Line => draw_line(f, area, block, chart),
        ChartKind::Bar => draw_bars(f, area, block, chart, Direction::Vertical),
        ChartKind::HorizontalBar => draw_bars(f, area, block, chart, Direction::Horizontal),
        ChartKind::Doughnut => draw_shares(f, area, block, chart),
    }
}

fn color_at(chart: &Chart, i: usize) -> Color {
    if chart.colors.is_empty() {
        theme::INFO
    } else {
        chart.colors[i % chart.colors.len()]
    }
}

fn draw_bars(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    block: Block<'_>,
    chart: &Chart,
    direction: Direction,
) {
    let body = inner(area);
    let label_w = match direction {
        Direction::Vertical => {
            let n = chart.labels.len().max(1) as u16;
            (body.width / n).saturating_sub(1).clamp(3, 12) as usize
        }
        Direction::Horizontal => 14,
    };
    let bars: Vec<Bar> = chart
        .labels
        .iter()
        .zip(&chart.values)
        .enumerate()
        .map(|(i, (label, &value))| {
            Bar::default()
                .value(value)
                .label(Line::from(truncate_end(label, label_w)))
                .style(Style::default().fg(color_at(chart, i)))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(color_at(chart, i))
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let mut widget = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .direction(direction)
        .bar_gap(1);
    widget = match direction {
        Direction::Vertical => widget.bar_width(label_w as u16),
        Direction::Horizontal => widget.bar_width(1),
    };
    f.render_widget(widget, area);
}

// Share of total per label, the terminal rendition of a doughnut.
fn draw_shares(f: &mut ratatui::Frame<'_>, area: Rect, block: Block<'_>, chart: &Chart) {
    let total: u64 = chart.values.iter().sum::<u64>().max(1);
    let body = inner(area);
    let label_w = 20usize;
    let bar_w = (body.width as usize).saturating_sub(label_w + 12).max(1);

    let lines: Vec<Line> = chart
        .labels
        .iter()
        .zip(&chart.values)
        .enumerate()
        .map(|(i, (label, &value))| {
            let pct = value as f64 / total as f64;
            let filled = ((pct * bar_w as f64).round() as usize).min(bar_w);
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color_at(chart, i))),
                Span::raw(format!("{:<w$}", truncate_end(label, label_w - 2), w = label_w - 2)),
                Span::styled("█".repeat(filled), Style::default().fg(color_at(chart, i))),
                Span::raw(" ".repeat(bar_w - filled)),
                Span::styled(
                    format!(" {value:>5} {:>3.0}%", pct * 100.0),
                    Style::default().fg(theme::MUTED),
                ),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_line(f: &mut ratatui::Frame<'_>, area: Rect, block: Block<'_>, chart: &Chart) {
    let points: Vec<(f64, f64)> = chart
        .values
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64, v as f64))
        .collect();
    let max = chart.values.iter().copied().max().unwrap_or(0).max(1) as f64;
    let last_x = points.len().saturating_sub(1).max(1) as f64;

    // every sixth label keeps the axis readable
    let x_labels: Vec<Span> = chart
        .labels
        .iter()
        .step_by(6)
        .chain(chart.labels.last())
        .map(|l| Span::styled(l.clone(), Style::default().fg(theme::MUTED)))
        .collect();
    let y_labels: Vec<Span> = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", max / 2.0)),
        Span::raw(format!("{max:.0}")),
    ];

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color_at(chart, 0)))
        .data(&points);

    let widget = LineChart::new(vec![dataset])
        .block(block)
        .x_axis(Axis::default().bounds([0.0, last_x]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, max]).labels(y_labels));
    f.render_widget(widget, area);
}
