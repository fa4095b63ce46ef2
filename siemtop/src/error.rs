//! Failure taxonomy for calls against the SIEM API.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No credential in the session store; the caller must route to login.
    #[error("not authenticated")]
    Unauthenticated,
    /// The server answered 401. The credential is already cleared.
    #[error("unauthorized")]
    Unauthorized,
    #[error("{message}")]
    RequestFailed { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid header {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Errors that bounce the user back to the login screen.
    pub fn needs_login(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::Unauthorized)
    }
}
