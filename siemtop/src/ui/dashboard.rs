//! Dashboard screen: agent/login/host/user panels around four chart slots.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::dashboard::{AgentRow, DashboardView, HostRow, LoginRow, Panel, UserRow};
use crate::ui::charts::draw_chart_slot;
use crate::ui::theme;
use crate::ui::util::truncate_middle;

pub fn draw_dashboard(f: &mut ratatui::Frame<'_>, area: Rect, view: &DashboardView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(45),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);
    draw_agents(f, top[0], &view.agents);
    draw_logins(f, top[1], &view.logins);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(top[2]);
    draw_hosts(f, right[0], &view.hosts);
    draw_users(f, right[1], &view.users);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);
    draw_chart_slot(f, mid[0], "Events by type", &view.events_by_type);
    draw_chart_slot(f, mid[1], "Severity", &view.severity);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[2]);
    draw_chart_slot(f, bottom[0], "Top processes", &view.processes);
    draw_chart_slot(f, bottom[1], "Activity (24h)", &view.timeline);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(title)
}

fn draw_placeholder(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, text: &str) {
    f.render_widget(
        Paragraph::new(Span::styled(text.to_string(), Style::default().fg(theme::MUTED)))
            .block(panel_block(title)),
        area,
    );
}

fn draw_agents(f: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel<AgentRow>) {
    let title = "Active agents";
    let rows = match panel {
        Panel::Placeholder(text) => return draw_placeholder(f, area, title, text),
        Panel::Items(rows) => rows,
    };
    let id_w = area.width.saturating_sub(16) as usize;
    let lines: Vec<Line> = rows
        .iter()
        .map(|a| {
            let (dot, color) = if a.online {
                ("●", theme::SUCCESS)
            } else {
                ("○", theme::MUTED)
            };
            Line::from(vec![
                Span::styled(format!("{dot} "), Style::default().fg(color)),
                Span::raw(format!("{:<w$}", truncate_middle(&a.id, id_w), w = id_w)),
                Span::styled(format!(" {}", a.seen_ago), Style::default().fg(theme::MUTED)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(panel_block(title)), area);
}

fn draw_logins(f: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel<LoginRow>) {
    let title = "Last logins";
    let rows = match panel {
        Panel::Placeholder(text) => return draw_placeholder(f, area, title, text),
        Panel::Items(rows) => rows,
    };
    let body = rows.iter().map(|l| {
        let (status, color) = if l.success {
            ("Success", theme::SUCCESS)
        } else {
            ("Failure", theme::DANGER)
        };
        Row::new(vec![
            Cell::from(l.timestamp.clone()).style(Style::default().fg(theme::MUTED)),
            Cell::from(l.user.clone()),
            Cell::from(status).style(Style::default().fg(color)),
            Cell::from(l.ip.clone()),
        ])
    });
    let header = Row::new(vec!["Time", "User", "Status", "IP"]).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let table = Table::new(
        body,
        [
            Constraint::Length(12),
            Constraint::Percentage(30),
            Constraint::Length(8),
            Constraint::Min(15),
        ],
    )
    .header(header)
    .block(panel_block(title))
    .column_spacing(1);
    f.render_widget(table, area);
}

fn draw_hosts(f: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel<HostRow>) {
    let title = "Hosts";
    let rows = match panel {
        Panel::Placeholder(text) => return draw_placeholder(f, area, title, text),
        Panel::Items(rows) => rows,
    };
    let lines: Vec<Line> = rows
        .iter()
        .map(|h| {
            Line::from(vec![
                Span::raw(h.name.clone()),
                Span::styled(" ●", Style::default().fg(theme::SUCCESS)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(panel_block(title)), area);
}

fn draw_users(f: &mut ratatui::Frame<'_>, area: Rect, panel: &Panel<UserRow>) {
    let title = "Top users";
    let rows = match panel {
        Panel::Placeholder(text) => return draw_placeholder(f, area, title, text),
        Panel::Items(rows) => rows,
    };
    let name_w = area.width.saturating_sub(10) as usize;
    let lines: Vec<Line> = rows
        .iter()
        .map(|u| {
            Line::from(vec![
                Span::raw(format!("{:<w$}", truncate_middle(&u.name, name_w), w = name_w)),
                Span::styled(format!("{:>6}", u.count), Style::default().fg(theme::INFO)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(panel_block(title)), area);
}
