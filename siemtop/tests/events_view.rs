//! Events view state: pagination, single in-flight fetch, filters and detail.

mod common;

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use siemtop::api::ApiClient;
use siemtop::error::ApiError;
use siemtop::events::{format_timestamp, EventsState, LoadPhase, TableView, SEARCH_DEBOUNCE};
use siemtop::json_view::TokenKind;
use siemtop::nav::Route;
use siemtop::types::EventsPage;

use common::{event, serve, wire_logged_in, EventsFake};

async fn load_with(state: &mut EventsState, api: &ApiClient, next: Option<bool>) {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let done = move |r| {
        let _ = tx.send(r);
    };
    let started = match next {
        None => state.load_events(api, done),
        Some(true) => state.next_page(api, done),
        Some(false) => state.prev_page(api, done),
    };
    assert!(started, "fetch did not start");
    let outcome = rx.recv().await.unwrap();
    state.finish_load(outcome);
}

fn page(value: Value) -> EventsPage {
    serde_json::from_value(value).unwrap()
}

fn sample_page() -> EventsPage {
    page(json!({
        "status": "success",
        "total": 120,
        "count": 5,
        "totalPages": 3,
        "data": [
            event(0, "user_login", "low", "Accepted password for admin"),
            event(1, "auth_failure", "high", "Failed password for root"),
            event(2, "file_access", "medium", "File access: root read /etc/shadow"),
            event(3, "auth_failure", "high", "Failed password for guest"),
            json!({ "event_type": "system_event", "raw_log": "kernel: FAILED to mount /data" }),
        ],
    }))
}

fn row_count(state: &EventsState) -> usize {
    match state.table() {
        TableView::Rows(rows) => rows.len(),
        _ => 0,
    }
}

#[tokio::test]
async fn pagination_follows_server_metadata() {
    let fake = EventsFake::new(120);
    let origin = serve(fake.clone().router()).await;
    let w = wire_logged_in(&origin, Route::Events);
    let mut state = EventsState::new();

    load_with(&mut state, &w.api, None).await;
    assert_eq!(state.total_pages(), 3);
    assert_eq!(state.total_label(), "Total: 120");
    let p = state.pagination();
    assert_eq!(p.label(), "Showing 1-50 of 120");
    assert!(!p.prev_enabled);
    assert!(p.next_enabled);
    assert_eq!(row_count(&state), 50);

    load_with(&mut state, &w.api, Some(true)).await;
    let p = state.pagination();
    assert_eq!(p.page, 2);
    assert_eq!(p.label(), "Showing 51-100 of 120");
    assert!(p.prev_enabled && p.next_enabled);

    load_with(&mut state, &w.api, Some(true)).await;
    let p = state.pagination();
    assert_eq!(p.label(), "Showing 101-120 of 120");
    assert!(p.prev_enabled);
    assert!(!p.next_enabled);
    assert_eq!(row_count(&state), 20);

    // no page past the last one
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    assert!(!state.next_page(&w.api, move |r| {
        let _ = tx.send(r);
    }));

    load_with(&mut state, &w.api, Some(false)).await;
    assert_eq!(state.current_page(), 2);
    assert_eq!(fake.hits(), 4);
}

#[tokio::test]
async fn only_one_fetch_in_flight() {
    let fake = EventsFake::new(120).with_delay(Duration::from_millis(200));
    let origin = serve(fake.clone().router()).await;
    let w = wire_logged_in(&origin, Route::Events);
    let mut state = EventsState::new();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let tx2 = tx.clone();
    assert!(state.load_events(&w.api, move |r| {
        let _ = tx.send(r);
    }));
    assert!(state.is_loading());
    assert_eq!(state.table(), TableView::Loading);
    assert!(!state.load_events(&w.api, move |r| {
        let _ = tx2.send(r);
    }));
    let p = state.pagination();
    assert!(!p.prev_enabled && !p.next_enabled);

    let outcome = rx.recv().await.unwrap();
    state.finish_load(outcome);
    assert!(!state.is_loading());
    assert_eq!(fake.hits(), 1);
    // the rejected call's sender was dropped without sending
    assert!(rx.recv().await.is_none());
}

#[test]
fn severity_filter_is_exact() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    assert_eq!(row_count(&state), 5);

    state.set_severity("high");
    assert_eq!(row_count(&state), 2);
    assert!(state.filtered_events().all(|e| e.severity.as_deref() == Some("high")));

    state.set_severity("");
    assert_eq!(row_count(&state), 5);
}

#[test]
fn type_and_severity_filters_combine() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    state.set_event_type("auth_failure");
    state.set_severity("low");
    assert_eq!(state.table(), TableView::NoData);
    assert_eq!(state.phase(), LoadPhase::Empty);
    state.clear_filters();
    assert_eq!(row_count(&state), 5);
}

#[test]
fn search_is_debounced_and_case_insensitive() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    let t0 = Instant::now();

    for c in "FAILED".chars() {
        state.push_search_char(c, t0);
    }
    assert!(!state.tick(t0 + Duration::from_millis(100)));
    assert_eq!(row_count(&state), 5);

    assert!(state.tick(t0 + SEARCH_DEBOUNCE));
    // two messages plus one raw_log-only match
    assert_eq!(row_count(&state), 3);
    assert!(!state.tick(t0 + SEARCH_DEBOUNCE * 2));

    state.set_search("", t0);
    state.tick(t0 + SEARCH_DEBOUNCE);
    assert_eq!(row_count(&state), 5);
}

#[test]
fn typing_pushes_the_debounce_deadline() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    let t0 = Instant::now();
    state.push_search_char('x', t0);
    let t1 = t0 + Duration::from_millis(250);
    state.push_search_char('y', t1);
    assert!(!state.tick(t0 + SEARCH_DEBOUNCE));
    assert!(state.tick(t1 + SEARCH_DEBOUNCE));
    assert_eq!(state.filter().search, "xy");
}

#[test]
fn filtered_rows_come_from_loaded_page() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    state.set_event_type("file_access");
    let all: Vec<_> = state.all_events().to_vec();
    for e in state.filtered_events() {
        assert!(all.iter().any(|a| a.timestamp == e.timestamp && a.message == e.message));
    }
}

#[test]
fn type_vocabulary_is_cumulative() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    state.finish_load(Ok(page(json!({
        "status": "success",
        "total": 120,
        "totalPages": 3,
        "data": [event(60, "config_change", "low", "Configuration file modified")],
    }))));
    let types: Vec<&str> = state.type_options().collect();
    assert_eq!(
        types,
        vec!["auth_failure", "config_change", "file_access", "system_event", "user_login"]
    );
}

#[test]
fn cycling_filters_walks_known_values() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));

    let mut seen = Vec::new();
    for _ in 0..5 {
        state.cycle_severity();
        seen.push(state.filter().severity.clone());
    }
    assert_eq!(seen, ["low", "medium", "high", "critical", ""]);

    state.cycle_event_type();
    assert_eq!(state.filter().event_type, "auth_failure");
    state.cycle_event_type();
    assert_eq!(state.filter().event_type, "file_access");
}

#[test]
fn failed_load_keeps_pagination_and_count() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    let before = state.pagination();

    state.finish_load(Err(ApiError::RequestFailed {
        status: 500,
        message: "database unreachable".into(),
    }));
    assert_eq!(state.table(), TableView::Error);
    assert_eq!(state.phase(), LoadPhase::Errored);
    assert_eq!(state.pagination(), before);
    assert_eq!(state.total_events(), 120);
}

#[test]
fn unsuccessful_body_renders_empty() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    state.finish_load(Ok(page(json!({ "status": "error", "error": "bad query" }))));
    assert_eq!(state.table(), TableView::NoData);
    assert_eq!(state.total_events(), 0);
    assert_eq!(state.pagination().label(), "Showing 0-0 of 0");
}

#[test]
fn filter_change_keeps_current_page() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    let page_before = state.current_page();
    state.set_severity("high");
    assert_eq!(state.current_page(), page_before);
    assert_eq!(state.pagination().label(), "Showing 1-50 of 120");
}

#[test]
fn missing_severity_shows_low() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));
    let TableView::Rows(rows) = state.table() else {
        panic!("expected rows");
    };
    assert_eq!(rows[4].severity, "low");
    assert_eq!(rows[4].message, "kernel: FAILED to mount /data");
    assert_eq!(rows[4].agent_id, "-");
}

#[test]
fn detail_opens_and_closes() {
    let mut state = EventsState::new();
    state.finish_load(Ok(sample_page()));

    assert!(!state.open_detail(99));
    assert!(state.detail().is_none());

    assert!(state.open_detail(1));
    let detail = state.detail().unwrap();
    assert!(detail.title.starts_with("auth_failure"));
    let has_key = detail.lines.iter().flatten().any(|t| {
        t.kind == TokenKind::Key && t.text.starts_with("\"event_type\"")
    });
    assert!(has_key);
    assert_eq!(state.selected(), 1);

    state.scroll_detail(3);
    assert_eq!(state.detail().unwrap().scroll, 3);
    state.scroll_detail(-10);
    assert_eq!(state.detail().unwrap().scroll, 0);

    state.close_detail();
    assert!(state.detail().is_none());
}

#[test]
fn detail_shows_the_record_as_received() {
    let mut state = EventsState::new();
    state.finish_load(Ok(page(json!({
        "status": "success",
        "total": 1,
        "data": [
            { "event_type": "user_login", "user": null, "message": "x", "pid": null },
        ],
    }))));

    assert!(state.open_detail(0));
    let detail = state.detail().unwrap();
    let text: Vec<String> = detail
        .lines
        .iter()
        .map(|l| l.iter().map(|t| t.text.as_str()).collect())
        .collect();
    assert_eq!(
        text,
        [
            "{",
            r#"  "event_type": "user_login","#,
            r#"  "user": null,"#,
            r#"  "message": "x","#,
            r#"  "pid": null"#,
            "}",
        ]
    );
    let nulls = detail
        .lines
        .iter()
        .flatten()
        .filter(|t| t.kind == TokenKind::Null)
        .count();
    assert_eq!(nulls, 2);
}

#[test]
fn timestamps_fall_back_to_raw_text() {
    assert_eq!(format_timestamp(None), "-");
    assert_eq!(format_timestamp(Some("last tuesday")), "last tuesday");
    let formatted = format_timestamp(Some("2024-05-01T10:00:00Z"));
    assert_eq!(formatted.len(), "01.05.2024 10:00:00".len());
    assert!(formatted.contains(".2024 "));
}
