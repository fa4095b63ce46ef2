//! Shared server state: the event store, credentials and the stats cache.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::generate::generate_events;
use crate::stats::DashboardStats;

pub const STATS_TTL: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    // newest first
    pub events: Arc<Vec<Value>>,
    pub user: Arc<str>,
    pub password: Arc<str>,
    pub stats_cache: Arc<RwLock<Option<(Instant, DashboardStats)>>>,
    pub stats_ttl: Duration,
}

impl AppState {
    /// Generate the sample store from `config` relative to `now`.
    pub fn new(config: &Config, now: DateTime<Utc>) -> Self {
        let events = generate_events(config.events, config.seed, now);
        Self::with_events(config, events)
    }

    /// Serve a caller-provided store. Events are ordered by `timestamp`
    /// descending (string order, as stored).
    pub fn with_events(config: &Config, mut events: Vec<Value>) -> Self {
        events.sort_by(|a, b| timestamp_of(b).cmp(timestamp_of(a)));
        Self {
            events: Arc::new(events),
            user: config.user.as_str().into(),
            password: config.password.as_str().into(),
            stats_cache: Arc::new(RwLock::new(None)),
            stats_ttl: STATS_TTL,
        }
    }

    pub fn with_stats_ttl(mut self, ttl: Duration) -> Self {
        self.stats_ttl = ttl;
        self
    }
}

fn timestamp_of(event: &Value) -> &str {
    event.get("timestamp").and_then(Value::as_str).unwrap_or("")
}
