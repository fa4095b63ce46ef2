//! Dashboard view: panels, chart slots updated in place, refresh scheduling.

mod common;

use std::time::{Duration, Instant};

use axum::{routing::get, Json, Router};
use chrono::{Duration as TimeDelta, SecondsFormat, Utc};
use serde_json::json;
use siemtop::dashboard::{
    await_chart_backend, host_from_agent, time_ago, ChartKind, Dashboard, DashboardView, Panel,
    LOAD_FAILED, NO_AGENTS, NO_ANALYSIS, NO_CHART_DATA,
};
use siemtop::error::ApiError;
use siemtop::nav::Route;
use siemtop::types::StatsSnapshot;
use tokio::sync::watch;

use common::{serve, wire_logged_in};

fn snapshot() -> StatsSnapshot {
    let now = Utc::now();
    let recent = (now - TimeDelta::minutes(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let stale = (now - TimeDelta::hours(3)).to_rfc3339_opts(SecondsFormat::Secs, true);
    serde_json::from_value(json!({
        "active_agents": { "web-01-agent": recent, "db-02-agent": stale },
        "events_by_type": { "user_login": 12, "auth_failure": 4 },
        "severity_distribution": { "critical": 1, "low": 9, "high": 3 },
        "top_processes": { "sshd": 9, "cron": 1, "nginx": 7, "sudo": 3, "docker": 5, "systemd": 2 },
        "top_users": { "root": 10, "guest": 1, "admin": 8, "nginx": 2, "postgres": 3, "backup_user": 4 },
        "events_per_hour": { "0": 3, "13": 8, "23": 1 },
        "last_logins": [
            { "timestamp": recent, "user": "admin", "event_type": "user_login", "source_ip": "10.0.0.5" },
            { "timestamp": stale, "user": "root", "event_type": "auth_failure", "ip": "10.0.0.9" },
        ],
    }))
    .unwrap()
}

#[test]
fn chart_is_created_once_and_updated_in_place() {
    let mut view = DashboardView::default();
    let stats = snapshot();
    view.render(&stats, Utc::now());
    view.render(&stats, Utc::now());
    view.render(&stats, Utc::now());

    for slot in [&view.events_by_type, &view.severity, &view.processes, &view.timeline] {
        assert_eq!(slot.instances_created(), 1);
        assert_eq!(slot.chart().unwrap().revision, 2);
        assert!(slot.visible().is_some());
    }
}

#[test]
fn empty_series_hides_chart_and_shows_placeholder() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());

    let mut empty = snapshot();
    empty.events_by_type = Some(Default::default());
    view.render(&empty, Utc::now());

    let slot = &view.events_by_type;
    assert!(slot.is_hidden());
    assert!(slot.visible().is_none());
    assert_eq!(slot.placeholder(), Some(NO_CHART_DATA));
    // the instance survives and comes back on new data
    assert!(slot.chart().is_some());
    view.render(&snapshot(), Utc::now());
    assert!(!view.events_by_type.is_hidden());
    assert_eq!(view.events_by_type.instances_created(), 1);
}

#[test]
fn missing_fields_degrade_per_widget() {
    let mut view = DashboardView::default();
    view.render(&StatsSnapshot::default(), Utc::now());
    assert_eq!(view.agents, Panel::Placeholder(NO_AGENTS));
    assert_eq!(view.logins, Panel::Placeholder(NO_ANALYSIS));
    assert_eq!(view.users, Panel::Placeholder(NO_ANALYSIS));
    assert_eq!(view.timeline.placeholder(), Some(NO_CHART_DATA));
    assert_eq!(view.timeline.instances_created(), 0);
}

#[test]
fn top_lists_are_sorted_and_capped() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());

    let chart = view.processes.visible().unwrap();
    assert_eq!(chart.kind, ChartKind::HorizontalBar);
    assert_eq!(chart.labels, ["sshd", "nginx", "docker", "sudo", "systemd"]);
    assert_eq!(chart.values, [9, 7, 5, 3, 2]);

    let Panel::Items(users) = &view.users else {
        panic!("expected users");
    };
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["root", "admin", "backup_user", "postgres", "nginx"]);
}

#[test]
fn timeline_always_has_24_hours() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());
    let chart = view.timeline.visible().unwrap();
    assert_eq!(chart.kind, ChartKind::Line);
    assert_eq!(chart.labels.len(), 24);
    assert_eq!(chart.labels[0], "00:00");
    assert_eq!(chart.labels[23], "23:00");
    assert_eq!(chart.values[13], 8);
    assert_eq!(chart.values[5], 0);
    assert_eq!(chart.values.iter().sum::<u64>(), 12);
}

#[test]
fn severity_chart_uses_fixed_order() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());
    let chart = view.severity.visible().unwrap();
    assert_eq!(chart.labels, ["Low", "High", "Critical"]);
    assert_eq!(chart.values, [9, 3, 1]);
}

#[test]
fn agents_online_within_five_minutes() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());
    let Panel::Items(agents) = &view.agents else {
        panic!("expected agents");
    };
    assert_eq!(agents[0].id, "web-01-agent");
    assert!(agents[0].online);
    assert_eq!(agents[0].seen_ago, "2 min ago");
    assert!(!agents[1].online);
    assert_eq!(agents[1].seen_ago, "3 h ago");
}

#[test]
fn last_logins_mark_success_and_address() {
    let mut view = DashboardView::default();
    view.render(&snapshot(), Utc::now());
    let Panel::Items(logins) = &view.logins else {
        panic!("expected logins");
    };
    assert!(logins[0].success);
    assert_eq!(logins[0].ip, "10.0.0.5");
    assert!(!logins[1].success);
    assert_eq!(logins[1].ip, "10.0.0.9");
}

#[test]
fn hosts_derive_from_agent_ids() {
    assert_eq!(host_from_agent("web-01-agent"), "web");
    assert_eq!(host_from_agent("-odd"), "-odd");
    assert_eq!(host_from_agent("solo"), "solo");
}

#[test]
fn relative_times() {
    let now = Utc::now();
    assert_eq!(time_ago(now - TimeDelta::seconds(20), now), "just now");
    assert_eq!(time_ago(now - TimeDelta::minutes(59), now), "59 min ago");
    assert_eq!(time_ago(now - TimeDelta::hours(5), now), "5 h ago");
    assert_eq!(time_ago(now - TimeDelta::days(2), now), "2 d ago");
}

#[test]
fn failure_marks_every_widget() {
    let mut dash = Dashboard::new();
    dash.finish_refresh(Ok(snapshot()), Utc::now());
    assert!(dash.view.last_refresh.is_some());

    dash.finish_refresh(
        Err(ApiError::RequestFailed {
            status: 500,
            message: "boom".into(),
        }),
        Utc::now(),
    );
    assert_eq!(dash.view.agents, Panel::Placeholder(LOAD_FAILED));
    assert_eq!(dash.view.hosts, Panel::Placeholder(LOAD_FAILED));
    assert_eq!(dash.view.severity.placeholder(), Some(LOAD_FAILED));
    assert!(dash.view.severity.is_hidden());
    assert_eq!(dash.view.severity.instances_created(), 1);
}

#[test]
fn refresh_is_due_on_interval() {
    let dash = Dashboard::with_interval(Duration::from_secs(30));
    let t0 = Instant::now();
    assert!(dash.is_due(t0));
}

#[tokio::test]
async fn refresh_fetches_and_renders() {
    let router = Router::new().route(
        "/api/stats",
        get(|| async { Json(json!({ "events_by_type": { "user_login": 3 } })) }),
    );
    let origin = serve(router).await;
    let w = wire_logged_in(&origin, Route::Dashboard);

    let mut dash = Dashboard::with_interval(Duration::from_secs(30));
    let t0 = Instant::now();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    dash.start_refresh(&w.api, t0, move |r| {
        let _ = tx.send(r);
    });
    assert!(dash.is_refreshing());
    assert!(!dash.is_due(t0 + Duration::from_secs(29)));
    assert!(dash.is_due(t0 + Duration::from_secs(30)));

    let outcome = rx.recv().await.unwrap();
    dash.finish_refresh(outcome, Utc::now());
    assert!(!dash.is_refreshing());
    assert_eq!(dash.view.events_by_type.chart().unwrap().values, [3]);
    assert_eq!(dash.view.agents, Panel::Placeholder(NO_AGENTS));
}

#[tokio::test]
async fn chart_backend_wait_is_capped() {
    let (_tx, rx) = watch::channel(false);
    let started = Instant::now();
    assert!(!await_chart_backend(rx, Duration::from_millis(50)).await);
    assert!(started.elapsed() >= Duration::from_millis(50));

    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send_replace(true);
    });
    assert!(await_chart_backend(rx, Duration::from_secs(5)).await);
}
