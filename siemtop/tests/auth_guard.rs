//! Auth guard: login/logout/require_auth and the navigator they drive.

mod common;

use axum::{http::HeaderMap, http::StatusCode, routing::get, Router};
use siemtop::auth::Auth;
use siemtop::nav::Route;
use siemtop::session::SessionStore;

use common::{is_admin, serve, wire, wire_logged_in};

async fn health_origin() -> String {
    let router = Router::new().route(
        "/api/health",
        get(|headers: HeaderMap| async move {
            if is_admin(&headers) {
                StatusCode::OK
            } else {
                StatusCode::UNAUTHORIZED
            }
        }),
    );
    serve(router).await
}

#[tokio::test]
async fn login_is_a_plain_boolean() {
    let origin = health_origin().await;
    let w = wire(&origin, Route::Login);
    let auth = Auth::new(w.api.clone());

    assert!(!auth.login("admin", "nope").await);
    assert!(!auth.is_authenticated());
    assert!(auth.login("admin", "admin").await);
    assert!(auth.is_authenticated());
}

#[tokio::test]
async fn login_against_dead_server_is_false() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let w = wire(&format!("http://127.0.0.1:{port}"), Route::Login);
    let auth = Auth::new(w.api.clone());
    assert!(!auth.login("admin", "admin").await);
    assert!(w.session.get().is_none());
}

#[test]
fn require_auth_routes_to_login_without_credential() {
    let w = wire("http://127.0.0.1:9", Route::Dashboard);
    let auth = Auth::new(w.api.clone());
    let mut rx = w.nav.subscribe();

    assert!(!auth.require_auth());
    assert_eq!(w.nav.current(), Route::Login);
    assert!(rx.has_changed().unwrap());
}

#[test]
fn require_auth_passes_with_credential() {
    let w = wire_logged_in("http://127.0.0.1:9", Route::Events);
    let auth = Auth::new(w.api.clone());
    assert!(auth.require_auth());
    assert_eq!(w.nav.current(), Route::Events);
}

#[test]
fn logout_clears_session_and_returns_to_login() {
    let w = wire_logged_in("http://127.0.0.1:9", Route::Dashboard);
    let auth = Auth::new(w.api.clone());
    auth.logout();
    assert!(w.session.get().is_none());
    assert_eq!(w.nav.current(), Route::Login);
    assert!(!auth.require_auth());
}

#[test]
fn only_login_is_public() {
    assert!(!Route::Login.is_protected());
    assert!(Route::Dashboard.is_protected());
    assert!(Route::Events.is_protected());
}
