//! File logging for the client. The TUI owns the terminal, so nothing goes to
//! stdout/stderr; logging is off unless `SIEMTOP_LOG` holds a filter directive.

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use tracing_subscriber::EnvFilter;

use crate::profiles::config_dir;

pub const LOG_ENV: &str = "SIEMTOP_LOG";

pub fn log_path() -> PathBuf {
    match std::env::var_os("XDG_STATE_HOME") {
        Some(state) => PathBuf::from(state).join("siemtop").join("siemtop.log"),
        None => config_dir().join("siemtop.log"),
    }
}

/// Install the global subscriber when `SIEMTOP_LOG` is set. Returns the log file
/// path when logging is active.
pub fn init() -> anyhow::Result<Option<PathBuf>> {
    let Ok(directive) = std::env::var(LOG_ENV) else {
        return Ok(None);
    };
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(Some(path))
}
