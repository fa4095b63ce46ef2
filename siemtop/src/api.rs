//! HTTP client for the SIEM API: Basic auth, 401 handling and error normalization.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::ApiError;
use crate::nav::{Navigator, Route};
use crate::session::{Credential, SessionStore};
use crate::types::{EventsPage, StatsSnapshot};

/// Per-call overrides for [`ApiClient::request`].
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged after the auth defaults; a header with the same name wins.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
    nav: Navigator,
}

impl ApiClient {
    /// `origin` is the server root (`http://host:port`); endpoints live under `/api`.
    pub fn new(
        origin: &str,
        session: Arc<dyn SessionStore>,
        nav: Navigator,
    ) -> Result<Self, ApiError> {
        let origin = Url::parse(origin)?;
        let base_url = format!("{}/api", origin.as_str().trim_end_matches('/'));
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            session,
            nav,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Probe `/health` with the given credentials. Only a 2xx stores them.
    /// A rejected login is `Ok(false)`; only transport failures are errors.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, ApiError> {
        let credential = Credential::encode(username, password);
        let resp = self
            .http
            .get(self.url("/health"))
            .header(AUTHORIZATION, credential.header_value())
            .send()
            .await?;

        if resp.status().is_success() {
            self.session.set(credential);
            debug!(user = username, "credentials accepted");
            Ok(true)
        } else {
            debug!(user = username, status = resp.status().as_u16(), "credentials rejected");
            Ok(false)
        }
    }

    pub async fn request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let Some(credential) = self.session.get() else {
            return Err(ApiError::Unauthenticated);
        };
        let headers = merge_headers(&credential, &options.headers)?;

        let mut req = self
            .http
            .request(options.method, self.url(endpoint))
            .headers(headers);
        if let Some(body) = options.body {
            req = req.body(body.to_string());
        }
        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!(endpoint, "credential rejected by server, returning to login");
            self.session.clear();
            self.nav.goto(Route::Login);
            return Err(ApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(endpoint, status = status.as_u16(), %message, "request failed");
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn get_typed<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let value = self.request(endpoint, RequestOptions::default()).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn stats(&self) -> Result<StatsSnapshot, ApiError> {
        self.get_typed("/stats").await
    }

    pub async fn events(&self, page: u32, limit: u32) -> Result<EventsPage, ApiError> {
        self.get_typed(&format!("/events?page={page}&limit={limit}"))
            .await
    }

    /// First 200 events in one go, for callers that filter everything client-side.
    pub async fn all_events(&self) -> Result<EventsPage, ApiError> {
        self.get_typed("/events?limit=200").await
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        self.request("/health", RequestOptions::default()).await
    }
}

/// Default auth headers, then caller headers in order (last write wins).
pub fn merge_headers(
    credential: &Credential,
    extra: &[(String, String)],
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let auth = HeaderValue::from_str(&credential.header_value())
        .map_err(|_| ApiError::InvalidHeader(AUTHORIZATION.to_string()))?;
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// `{"error": "..."}` from the body when present, otherwise `HTTP <status>`.
pub fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
