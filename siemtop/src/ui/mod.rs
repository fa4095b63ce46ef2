//! UI module root: exposes drawing functions for individual screens and panels.

pub mod charts;
pub mod dashboard;
pub mod detail;
pub mod events;
pub mod header;
pub mod login;
pub mod theme;
pub mod util;
