//! Route handlers. Authentication happens in the middleware layer.

use std::collections::HashMap;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;
use crate::stats::{compute_stats, DashboardStats};

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 200;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "SIEM Web API is running",
    }))
}

/// Normalized `page`/`limit`: non-numeric or < 1 falls back to the defaults,
/// `limit` is capped at [`MAX_LIMIT`].
pub fn page_params(query: &HashMap<String, String>) -> (usize, usize) {
    let int = |key: &str| {
        query
            .get(key)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };
    let page = usize::try_from(int("page")).ok().filter(|&p| p >= 1).unwrap_or(1);
    let limit = usize::try_from(int("limit"))
        .ok()
        .filter(|&l| l >= 1)
        .unwrap_or(DEFAULT_LIMIT)
        .min(MAX_LIMIT);
    (page, limit)
}

pub async fn events(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let (page, limit) = page_params(&query);
    let total = state.events.len();
    let start = (page - 1).saturating_mul(limit);
    let data: &[Value] = if start >= total {
        &[]
    } else {
        &state.events[start..(start + limit).min(total)]
    };
    debug!(page, limit, count = data.len(), "events page");

    Json(json!({
        "status": "success",
        "count": data.len(),
        "total": total,
        "page": page,
        "limit": limit,
        "totalPages": total.div_ceil(limit),
        "data": data,
    }))
}

pub async fn stats(State(state): State<AppState>) -> Json<DashboardStats> {
    {
        let cache = state.stats_cache.read().await;
        if let Some((at, stats)) = cache.as_ref() {
            if at.elapsed() < state.stats_ttl {
                return Json(stats.clone());
            }
        }
    }

    let stats = compute_stats(&state.events, Utc::now());
    debug!(agents = stats.active_agents.len(), "stats recomputed");
    *state.stats_cache.write().await = Some((Instant::now(), stats.clone()));
    Json(stats)
}
