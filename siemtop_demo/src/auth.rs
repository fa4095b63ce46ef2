//! HTTP Basic auth middleware.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use tracing::warn;

use crate::state::AppState;

pub const REALM: &str = r#"Basic realm="Authorization Required""#;
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: invalid login or password";

pub async fn require_basic_auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match basic_credentials(req.headers()) {
        Some((user, pass)) if user == *state.user && pass == *state.password => next.run(req).await,
        other => {
            warn!(
                path = %req.uri().path(),
                user = other.as_ref().map(|(u, _)| u.as_str()).unwrap_or("-"),
                "rejected request"
            );
            unauthorized()
        }
    }
}

pub fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, REALM)],
        Json(json!({ "error": UNAUTHORIZED_MESSAGE })),
    )
        .into_response()
}

/// Decode `Authorization: Basic base64(user:pass)`. Malformed headers are `None`.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
