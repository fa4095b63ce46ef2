//! Sample data generator behaviour.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use siemtop_demo::generate::{generate_events, AGENTS, EVENT_TYPES};

#[test]
fn same_seed_same_events() {
    let now = Utc::now();
    let a = generate_events(40, 11, now);
    let b = generate_events(40, 11, now);
    assert_eq!(a, b);
    assert_eq!(a.len(), 40);
    assert_ne!(a, generate_events(40, 12, now));
}

#[test]
fn events_fall_within_the_last_day() {
    let now = Utc::now();
    for e in generate_events(200, 3, now) {
        let ts = DateTime::parse_from_rfc3339(e["timestamp"].as_str().unwrap()).unwrap();
        let age = now.signed_duration_since(ts);
        assert!(age >= Duration::zero() - Duration::seconds(1));
        assert!(age <= Duration::hours(24));
        assert!(AGENTS.contains(&e["agent_id"].as_str().unwrap()));
        assert!(EVENT_TYPES.contains(&e["event_type"].as_str().unwrap()));
    }
}

#[test]
fn auth_failures_and_escalations_are_high() {
    let events = generate_events(500, 5, Utc::now());
    let forced: Vec<&Value> = events
        .iter()
        .filter(|e| {
            matches!(
                e["event_type"].as_str(),
                Some("auth_failure" | "privilege_escalation")
            )
        })
        .collect();
    assert!(!forced.is_empty());
    assert!(forced.iter().all(|e| e["severity"] == "high"));
}

#[test]
fn logins_carry_source_ip_and_raw_log() {
    let events = generate_events(300, 9, Utc::now());
    let login = events
        .iter()
        .find(|e| e["event_type"] == "user_login")
        .expect("a login among 300 events");
    let ip = login["source_ip"].as_str().unwrap();
    assert!(ip.starts_with("192.168."));
    assert!(login["message"].as_str().unwrap().contains(ip));
    assert!(login["raw_log"].as_str().unwrap().ends_with(login["message"].as_str().unwrap()));
}
