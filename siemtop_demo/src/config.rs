//! Runtime configuration from the environment and command line.

use std::env;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_EVENTS: usize = 150;
pub const DEFAULT_SEED: u64 = 0x5135_7019;

#[derive(Debug, Clone)]
pub struct Config {
    pub user: String,
    pub password: String,
    /// Number of generated sample events.
    pub events: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: "admin".into(),
            password: "admin".into(),
            events: DEFAULT_EVENTS,
            seed: DEFAULT_SEED,
        }
    }
}

impl Config {
    /// `SIEMTOP_DEMO_USER`, `SIEMTOP_DEMO_PASSWORD`, `SIEMTOP_DEMO_EVENTS`,
    /// `SIEMTOP_DEMO_SEED`; unset or unparseable values fall back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            user: env::var("SIEMTOP_DEMO_USER").unwrap_or(d.user),
            password: env::var("SIEMTOP_DEMO_PASSWORD").unwrap_or(d.password),
            events: env_parse("SIEMTOP_DEMO_EVENTS").unwrap_or(d.events),
            seed: env_parse("SIEMTOP_DEMO_SEED").unwrap_or(d.seed),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// `--port N`, `-p N` or `--port=N`; the long form wins when both are given.
pub fn parse_port<I: IntoIterator<Item = String>>(args: I, default_port: u16) -> u16 {
    let mut it = args.into_iter();
    let _ = it.next(); // program name
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    while let Some(a) = it.next() {
        match a.as_str() {
            "--port" => long = it.next(),
            "-p" => short = it.next(),
            _ if a.starts_with("--port=") => {
                if let Some((_, v)) = a.split_once('=') {
                    long = Some(v.to_string());
                }
            }
            _ => {}
        }
    }
    long.or(short)
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(default_port)
}
