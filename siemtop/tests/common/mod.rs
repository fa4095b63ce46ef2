//! Shared helpers: an in-process axum server and a wired-up client.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use siemtop::api::ApiClient;
use siemtop::nav::{Navigator, Route};
use siemtop::session::{Credential, MemorySession, SessionStore};

/// Serve `router` on an ephemeral port; returns the origin (`http://127.0.0.1:N`).
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub struct Wired {
    pub api: ApiClient,
    pub session: Arc<MemorySession>,
    pub nav: Navigator,
}

pub fn wire(origin: &str, route: Route) -> Wired {
    let session = Arc::new(MemorySession::new());
    let nav = Navigator::new(route);
    let api = ApiClient::new(origin, session.clone(), nav.clone()).unwrap();
    Wired { api, session, nav }
}

/// Client already holding `admin:admin`.
pub fn wire_logged_in(origin: &str, route: Route) -> Wired {
    let w = wire(origin, route);
    w.session.set(Credential::encode("admin", "admin"));
    w
}

pub const ADMIN_BASIC: &str = "Basic YWRtaW46YWRtaW4=";

pub fn is_admin(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == ADMIN_BASIC)
}

pub fn event(i: u64, kind: &str, severity: &str, message: &str) -> Value {
    json!({
        "timestamp": format!("2024-05-01T10:{:02}:00Z", i % 60),
        "agent_id": "web-01-agent",
        "event_type": kind,
        "severity": severity,
        "user": "root",
        "message": message,
        "raw_log": format!("May 01 host sshd[{i}]: {message}"),
    })
}

/// A paginated `/api/events` over `total` synthetic events, counting hits and
/// optionally delaying each response.
#[derive(Clone)]
pub struct EventsFake {
    pub total: u64,
    pub delay: Duration,
    pub hits: Arc<AtomicUsize>,
}

impl EventsFake {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            delay: Duration::ZERO,
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/api/events", get(fake_events))
            .with_state(self)
    }
}

const KINDS: [(&str, &str); 4] = [
    ("user_login", "low"),
    ("auth_failure", "high"),
    ("file_access", "medium"),
    ("process_start", "low"),
];

async fn fake_events(
    State(fake): State<EventsFake>,
    headers: HeaderMap,
    Query(q): Query<std::collections::HashMap<String, String>>,
) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    if !fake.delay.is_zero() {
        tokio::time::sleep(fake.delay).await;
    }
    if !is_admin(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let page: u64 = q.get("page").and_then(|v| v.parse().ok()).unwrap_or(1);
    let limit: u64 = q.get("limit").and_then(|v| v.parse().ok()).unwrap_or(50);
    let start = (page - 1) * limit;
    let end = (start + limit).min(fake.total);
    let data: Vec<Value> = (start..end)
        .map(|i| {
            let (kind, sev) = KINDS[(i % 4) as usize];
            event(i, kind, sev, &format!("event number {i}"))
        })
        .collect();
    Json(json!({
        "status": "success",
        "count": data.len(),
        "total": fake.total,
        "page": page,
        "limit": limit,
        "totalPages": fake.total.div_ceil(limit),
        "data": data,
    }))
    .into_response()
}

/// Poll `check` every few ms until it holds or two seconds pass.
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
