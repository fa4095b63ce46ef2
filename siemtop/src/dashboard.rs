//! Dashboard view state: maps a stats snapshot onto panels and chart slots, and owns
//! the refresh schedule.
//!
//! Chart instances are created on first data and updated in place afterwards, so a
//! refresh never tears a chart down.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use ratatui::style::Color;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::types::{Event, Severity, StatsSnapshot};
use crate::ui::theme;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);
pub const CHART_READY_TIMEOUT: Duration = Duration::from_secs(10);
const ONLINE_WINDOW_SECS: i64 = 5 * 60;
const TOP_N: usize = 5;

pub const NO_AGENTS: &str = "No active agents";
pub const NO_HOSTS: &str = "No active hosts";
pub const NO_ANALYSIS: &str = "No data to analyze";
pub const NO_CHART_DATA: &str = "No data";
pub const LOAD_FAILED: &str = "Failed to load data";

/// A list panel: placeholder text or rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel<T> {
    Placeholder(&'static str),
    Items(Vec<T>),
}

impl<T> Panel<T> {
    fn from_items(items: Vec<T>, empty: &'static str) -> Self {
        if items.is_empty() {
            Panel::Placeholder(empty)
        } else {
            Panel::Items(items)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRow {
    pub id: String,
    pub online: bool,
    pub seen_ago: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRow {
    pub timestamp: String,
    pub user: String,
    pub success: bool,
    pub ip: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRow {
    pub name: String,
    pub agent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Doughnut,
    Bar,
    HorizontalBar,
    Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<Color>,
    /// Bumped on every in-place update.
    pub revision: u64,
}

/// One chart position on the dashboard. Keeps its chart across refreshes; hiding it
/// for a placeholder does not drop the instance.
#[derive(Debug, Clone, Default)]
pub struct ChartSlot {
    chart: Option<Chart>,
    hidden: bool,
    placeholder: Option<&'static str>,
    created: u32,
}

impl ChartSlot {
    pub fn show(
        &mut self,
        kind: ChartKind,
        labels: Vec<String>,
        values: Vec<u64>,
        colors: Vec<Color>,
    ) {
        match self.chart.as_mut() {
            Some(c) => {
                c.labels = labels;
                c.values = values;
                c.colors = colors;
                c.revision += 1;
            }
            None => {
                self.chart = Some(Chart {
                    kind,
                    labels,
                    values,
                    colors,
                    revision: 0,
                });
                self.created += 1;
            }
        }
        self.hidden = false;
        self.placeholder = None;
    }

    pub fn show_placeholder(&mut self, text: &'static str) {
        self.hidden = true;
        self.placeholder = Some(text);
    }

    /// The chart to draw, `None` while hidden or before first data.
    pub fn visible(&self) -> Option<&Chart> {
        if self.hidden {
            None
        } else {
            self.chart.as_ref()
        }
    }

    pub fn chart(&self) -> Option<&Chart> {
        self.chart.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.placeholder
    }

    pub fn instances_created(&self) -> u32 {
        self.created
    }
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub agents: Panel<AgentRow>,
    pub logins: Panel<LoginRow>,
    pub hosts: Panel<HostRow>,
    pub users: Panel<UserRow>,
    pub events_by_type: ChartSlot,
    pub severity: ChartSlot,
    pub processes: ChartSlot,
    pub timeline: ChartSlot,
    pub last_refresh: Option<DateTime<Local>>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            agents: Panel::Placeholder(NO_AGENTS),
            logins: Panel::Placeholder(NO_ANALYSIS),
            hosts: Panel::Placeholder(NO_HOSTS),
            users: Panel::Placeholder(NO_ANALYSIS),
            events_by_type: ChartSlot::default(),
            severity: ChartSlot::default(),
            processes: ChartSlot::default(),
            timeline: ChartSlot::default(),
            last_refresh: None,
        }
    }
}

impl DashboardView {
    /// Fan a snapshot out to every widget. Each widget copes with its field missing.
    pub fn render(&mut self, stats: &StatsSnapshot, now: DateTime<Utc>) {
        self.render_agents(stats.active_agents.as_ref(), now);
        self.render_last_logins(stats.last_logins.as_deref());
        self.render_events_by_type(stats.events_by_type.as_ref());
        self.render_severity(stats.severity_distribution.as_ref());
        self.render_hosts(stats.active_agents.as_ref());
        self.render_processes(stats.top_processes.as_ref());
        self.render_users(stats.top_users.as_ref());
        self.render_timeline(stats.events_per_hour.as_ref());
    }

    pub fn render_agents(&mut self, agents: Option<&BTreeMap<String, String>>, now: DateTime<Utc>) {
        let Some(agents) = agents.filter(|a| !a.is_empty()) else {
            self.agents = Panel::Placeholder(NO_AGENTS);
            return;
        };
        let mut entries: Vec<(&String, Option<DateTime<Utc>>)> = agents
            .iter()
            .map(|(id, seen)| (id, parse_utc(seen)))
            .collect();
        // newest first; unparseable timestamps sink to the bottom
        entries.sort_by_key(|(_, seen)| Reverse(*seen));

        let rows = entries
            .into_iter()
            .map(|(id, seen)| AgentRow {
                id: id.clone(),
                online: seen.is_some_and(|t| (now - t).num_seconds() < ONLINE_WINDOW_SECS),
                seen_ago: seen.map_or_else(|| "-".into(), |t| time_ago(t, now)),
            })
            .collect();
        self.agents = Panel::Items(rows);
    }

    pub fn render_last_logins(&mut self, logins: Option<&[Event]>) {
        let rows = logins
            .unwrap_or_default()
            .iter()
            .map(|e| LoginRow {
                timestamp: format_short(e.timestamp.as_deref()),
                user: e
                    .user
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .unwrap_or("-")
                    .to_string(),
                success: e.event_type.as_deref() == Some("user_login"),
                ip: e.address().unwrap_or("-").to_string(),
            })
            .collect();
        self.logins = Panel::from_items(rows, NO_ANALYSIS);
    }

    pub fn render_events_by_type(&mut self, by_type: Option<&BTreeMap<String, u64>>) {
        let Some(by_type) = by_type.filter(|m| !m.is_empty()) else {
            self.events_by_type.show_placeholder(NO_CHART_DATA);
            return;
        };
        let labels: Vec<String> = by_type.keys().cloned().collect();
        let values: Vec<u64> = by_type.values().copied().collect();
        let colors = (0..labels.len())
            .map(|i| theme::PALETTE[i % theme::PALETTE.len()])
            .collect();
        self.events_by_type
            .show(ChartKind::Doughnut, labels, values, colors);
    }

    pub fn render_severity(&mut self, dist: Option<&BTreeMap<String, u64>>) {
        let Some(dist) = dist.filter(|m| !m.is_empty()) else {
            self.severity.show_placeholder(NO_CHART_DATA);
            return;
        };
        let present: Vec<(Severity, u64)> = Severity::ALL
            .into_iter()
            .filter_map(|s| dist.get(s.as_str()).map(|&n| (s, n)))
            .collect();
        let labels = present.iter().map(|(s, _)| capitalize(s.as_str())).collect();
        let values = present.iter().map(|&(_, n)| n).collect();
        let colors = present
            .iter()
            .map(|&(s, _)| theme::severity_color(s))
            .collect();
        self.severity.show(ChartKind::Bar, labels, values, colors);
    }

    pub fn render_hosts(&mut self, agents: Option<&BTreeMap<String, String>>) {
        let rows = agents
            .map(|a| {
                a.keys()
                    .take(TOP_N)
                    .map(|agent| HostRow {
                        name: host_from_agent(agent).to_string(),
                        agent: agent.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.hosts = Panel::from_items(rows, NO_HOSTS);
    }

    pub fn render_processes(&mut self, processes: Option<&BTreeMap<String, u64>>) {
        let Some(processes) = processes.filter(|m| !m.is_empty()) else {
            self.processes.show_placeholder(NO_CHART_DATA);
            return;
        };
        let top = top_n(processes);
        let labels = top.iter().map(|(name, _)| name.to_string()).collect();
        let values = top.iter().map(|&(_, n)| n).collect();
        self.processes
            .show(ChartKind::HorizontalBar, labels, values, vec![theme::INFO]);
    }

    pub fn render_users(&mut self, users: Option<&BTreeMap<String, u64>>) {
        let rows = users
            .map(|u| {
                top_n(u)
                    .into_iter()
                    .map(|(name, count)| UserRow {
                        name: name.to_string(),
                        count,
                    })
                    .collect()
            })
            .unwrap_or_default();
        self.users = Panel::from_items(rows, NO_ANALYSIS);
    }

    pub fn render_timeline(&mut self, per_hour: Option<&BTreeMap<u8, u64>>) {
        let Some(per_hour) = per_hour.filter(|m| !m.is_empty()) else {
            self.timeline.show_placeholder(NO_CHART_DATA);
            return;
        };
        let labels = (0..24u8).map(|h| format!("{h:02}:00")).collect();
        let values = (0..24u8)
            .map(|h| per_hour.get(&h).copied().unwrap_or(0))
            .collect();
        self.timeline
            .show(ChartKind::Line, labels, values, vec![theme::INFO]);
    }

    /// Every widget shows the load failure; charts are hidden but kept.
    pub fn show_error(&mut self) {
        self.agents = Panel::Placeholder(LOAD_FAILED);
        self.logins = Panel::Placeholder(LOAD_FAILED);
        self.hosts = Panel::Placeholder(LOAD_FAILED);
        self.users = Panel::Placeholder(LOAD_FAILED);
        for slot in [
            &mut self.events_by_type,
            &mut self.severity,
            &mut self.processes,
            &mut self.timeline,
        ] {
            slot.show_placeholder(LOAD_FAILED);
        }
    }
}

/// Refresh scheduling around a [`DashboardView`]. The timer fires every
/// [`REFRESH_INTERVAL`] regardless of failures or fetches still in flight.
#[derive(Debug)]
pub struct Dashboard {
    pub view: DashboardView,
    interval: Duration,
    last_fetch: Option<Instant>,
    in_flight: usize,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::with_interval(REFRESH_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            view: DashboardView::default(),
            interval,
            last_fetch: None,
            in_flight: 0,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_fetch
            .map_or(true, |t| now.duration_since(t) >= self.interval)
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight > 0
    }

    /// Kick off a stats fetch; `done` hands the outcome back to
    /// [`Dashboard::finish_refresh`].
    pub fn start_refresh<F>(&mut self, api: &ApiClient, now: Instant, done: F)
    where
        F: FnOnce(Result<StatsSnapshot, ApiError>) + Send + 'static,
    {
        self.last_fetch = Some(now);
        self.in_flight += 1;
        let api = api.clone();
        tokio::spawn(async move {
            done(api.stats().await);
        });
    }

    pub fn finish_refresh(&mut self, outcome: Result<StatsSnapshot, ApiError>, now: DateTime<Utc>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match outcome {
            Ok(stats) => {
                self.view.render(&stats, now);
                self.view.last_refresh = Some(now.with_timezone(&Local));
                info!("dashboard refreshed");
            }
            Err(e) => {
                warn!("failed to load dashboard: {e}");
                self.view.show_error();
            }
        }
    }
}

/// Wait for the chart backend to report ready, giving up after `cap`. Returns
/// whether it became ready; callers proceed either way.
pub async fn await_chart_backend(mut ready: watch::Receiver<bool>, cap: Duration) -> bool {
    match tokio::time::timeout(cap, ready.wait_for(|r| *r)).await {
        Ok(Ok(_)) => true,
        Ok(Err(_)) => false,
        Err(_) => {
            warn!("chart backend not ready after {cap:?}, continuing");
            false
        }
    }
}

fn parse_utc(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// Highest counts first; ties keep key order.
fn top_n(counts: &BTreeMap<String, u64>) -> Vec<(&str, u64)> {
    let mut v: Vec<(&str, u64)> = counts.iter().map(|(k, &n)| (k.as_str(), n)).collect();
    v.sort_by_key(|&(_, n)| Reverse(n));
    v.truncate(TOP_N);
    v
}

/// Hostname part of an agent id (`web-01-agent` -> `web`); the whole id when the
/// prefix is empty.
pub fn host_from_agent(agent: &str) -> &str {
    match agent.split('-').next() {
        Some(prefix) if !prefix.is_empty() => prefix,
        _ => agent,
    }
}

pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    let mins = secs.div_euclid(60);
    let hours = secs.div_euclid(3600);
    let days = secs.div_euclid(86_400);
    if mins < 1 {
        "just now".into()
    } else if mins < 60 {
        format!("{mins} min ago")
    } else if hours < 24 {
        format!("{hours} h ago")
    } else {
        format!("{days} d ago")
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `dd.mm HH:MM` in local time.
fn format_short(ts: Option<&str>) -> String {
    let Some(ts) = ts.filter(|s| !s.is_empty()) else {
        return "-".into();
    };
    match DateTime::parse_from_rfc3339(ts) {
        Ok(dt) => dt.with_timezone(&Local).format("%d.%m %H:%M").to_string(),
        Err(_) => ts.to_string(),
    }
}
