//! Auth guard: gates protected screens and turns login attempts into plain booleans.

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::nav::Route;

#[derive(Clone)]
pub struct Auth {
    api: ApiClient,
}

impl Auth {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Presence check only; freshness is enforced by the server via 401s.
    pub fn is_authenticated(&self) -> bool {
        self.api.session().get().is_some()
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.api.authenticate(username, password).await {
            Ok(true) => {
                info!(user = username, "logged in");
                true
            }
            Ok(false) => {
                info!(user = username, "login rejected");
                false
            }
            Err(e) => {
                warn!(user = username, "login error: {e}");
                false
            }
        }
    }

    pub fn logout(&self) {
        self.api.session().clear();
        self.api.navigator().goto(Route::Login);
        info!("logged out");
    }

    /// Returns whether the caller may proceed; routes to login when it may not.
    pub fn require_auth(&self) -> bool {
        if self.is_authenticated() {
            true
        } else {
            self.api.navigator().goto(Route::Login);
            false
        }
    }
}
