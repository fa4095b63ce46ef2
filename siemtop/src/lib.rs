//! siemtop: terminal dashboard for a SIEM security-event API.
//!
//! The view-state types ([`events::EventsState`], [`dashboard::Dashboard`]) hold no
//! terminal handles, so they can be driven directly from tests.

pub mod api;
pub mod app;
pub mod auth;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod events;
pub mod json_view;
pub mod logging;
pub mod nav;
pub mod profiles;
pub mod session;
pub mod types;
pub mod ui;
