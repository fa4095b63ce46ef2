//! Types that mirror the SIEM API's JSON schema.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One security event. Unknown fields are kept in `extra`; the record exactly as the
/// server sent it (nulls and key order included) is kept in `raw` for the detail view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_log: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub raw: Value,
}

#[derive(Deserialize)]
struct EventFields {
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    agent_id: Option<String>,
    #[serde(default)]
    event_type: Option<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    source_ip: Option<String>,
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    raw_log: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let f = EventFields::deserialize(&raw).map_err(de::Error::custom)?;
        Ok(Event {
            timestamp: f.timestamp,
            agent_id: f.agent_id,
            event_type: f.event_type,
            severity: f.severity,
            user: f.user,
            source_ip: f.source_ip,
            ip: f.ip,
            message: f.message,
            raw_log: f.raw_log,
            extra: f.extra,
            raw,
        })
    }
}

impl Event {
    /// The full record for display: the received JSON when there is one, otherwise
    /// the typed fields.
    pub fn record(&self) -> serde_json::Result<Value> {
        match &self.raw {
            Value::Null => serde_json::to_value(self),
            raw => Ok(raw.clone()),
        }
    }


    /// Source address, falling back to the legacy `ip` field.
    pub fn address(&self) -> Option<&str> {
        non_empty(&self.source_ip).or_else(|| non_empty(&self.ip))
    }

    /// Text shown in the message column: message, else raw log.
    pub fn summary(&self) -> Option<&str> {
        non_empty(&self.message).or_else(|| non_empty(&self.raw_log))
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sev| sev.as_str() == s)
    }
}

/// One page of `/events`. The server reports `total` (all events) and `count`
/// (items on this page); older servers sent only `count`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventsPage {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: Option<Vec<Event>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default, rename = "totalPages")]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl EventsPage {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success") && self.data.is_some()
    }

    pub fn total_events(&self) -> u64 {
        match self.total {
            Some(t) if t > 0 => t,
            _ => self.count.unwrap_or(0),
        }
    }

    /// Never below one, even for an empty result set.
    pub fn total_pages(&self) -> u32 {
        self.total_pages.filter(|&p| p > 0).unwrap_or(1)
    }
}

/// Aggregates served by `/stats`. Every field may be missing or null.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatsSnapshot {
    /// agent id -> last seen (RFC 3339)
    #[serde(default)]
    pub active_agents: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub last_logins: Option<Vec<Event>>,
    #[serde(default)]
    pub events_by_type: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub severity_distribution: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub top_processes: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub top_users: Option<BTreeMap<String, u64>>,
    /// hour of day (0..=23) -> count
    #[serde(default)]
    pub events_per_hour: Option<BTreeMap<u8, u64>>,
}
