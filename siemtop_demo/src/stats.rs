//! Dashboard aggregation over the raw event store.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde::Serialize;
use serde_json::Value;

pub const LAST_LOGINS: usize = 10;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    /// Most recent event per agent.
    pub active_agents: BTreeMap<String, DateTime<FixedOffset>>,
    pub events_by_type: BTreeMap<String, u64>,
    pub severity_distribution: BTreeMap<String, u64>,
    pub top_users: BTreeMap<String, u64>,
    pub top_processes: BTreeMap<String, u64>,
    /// Hour of day (in the event's own offset) to count.
    pub events_per_hour: BTreeMap<u32, u64>,
    pub last_logins: Vec<Value>,
}

fn str_field<'a>(event: &'a Value, key: &str) -> &'a str {
    event.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Events without an `agent_id` or with an unparseable `timestamp` are skipped.
/// Only events from the last 24 hours feed the counters; the agent map and the
/// login list look at everything.
pub fn compute_stats(events: &[Value], now: DateTime<Utc>) -> DashboardStats {
    let mut stats = DashboardStats::default();
    let mut logins: Vec<(DateTime<FixedOffset>, &Value)> = Vec::new();

    for event in events {
        let Some(agent) = event.get("agent_id").and_then(Value::as_str) else {
            continue;
        };
        let Ok(at) = DateTime::parse_from_rfc3339(str_field(event, "timestamp")) else {
            continue;
        };

        stats
            .active_agents
            .entry(agent.to_string())
            .and_modify(|seen| {
                if at > *seen {
                    *seen = at;
                }
            })
            .or_insert(at);

        let event_type = str_field(event, "event_type");
        if now.signed_duration_since(at) <= Duration::hours(24) {
            *stats.events_by_type.entry(event_type.to_string()).or_default() += 1;
            *stats
                .severity_distribution
                .entry(str_field(event, "severity").to_string())
                .or_default() += 1;
            let user = str_field(event, "user");
            if !user.is_empty() {
                *stats.top_users.entry(user.to_string()).or_default() += 1;
            }
            let process = str_field(event, "process");
            if !process.is_empty() {
                *stats.top_processes.entry(process.to_string()).or_default() += 1;
            }
            *stats.events_per_hour.entry(at.hour()).or_default() += 1;
        }

        if matches!(event_type, "user_login" | "auth_failure") {
            logins.push((at, event));
        }
    }

    logins.sort_by(|a, b| b.0.cmp(&a.0));
    stats.last_logins = logins
        .into_iter()
        .take(LAST_LOGINS)
        .map(|(_, e)| e.clone())
        .collect();
    stats
}
