//! Deterministic sample events spread over the 24 hours before `now`.

use chrono::{DateTime, Duration, Local, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use serde_json::Value;

pub const EVENT_TYPES: [&str; 8] = [
    "user_login",
    "auth_failure",
    "system_event",
    "file_access",
    "network_connection",
    "process_start",
    "privilege_escalation",
    "config_change",
];
const USERS: [&str; 10] = [
    "admin",
    "root",
    "developer",
    "operator",
    "security",
    "guest",
    "service_account",
    "backup_user",
    "nginx",
    "postgres",
];
const PROCESSES: [&str; 10] = [
    "sshd", "sudo", "systemd", "nginx", "postgres", "docker", "cron", "auditd", "firewalld",
    "journald",
];
pub const AGENTS: [&str; 5] = [
    "agent-ubuntu-01",
    "agent-centos-02",
    "agent-debian-03",
    "agent-arch-04",
    "agent-fedora-05",
];
const SOURCES: [&str; 6] = ["auth", "syslog", "audit", "kernel", "application", "security"];
const HOSTNAMES: [&str; 5] = [
    "webserver-01",
    "dbserver-02",
    "appserver-03",
    "monitoring-04",
    "gateway-05",
];
const SENSITIVE_FILES: [&str; 5] = [
    "/etc/passwd",
    "/etc/shadow",
    "/var/log/auth.log",
    "/etc/ssh/sshd_config",
    "/root/.ssh/authorized_keys",
];
const CONFIG_FILES: [&str; 4] = [
    "/etc/sysconfig/network",
    "/etc/nginx/nginx.conf",
    "/etc/ssh/sshd_config",
    "/etc/firewalld/zones/public.xml",
];

#[derive(Debug, Serialize)]
struct SampleEvent {
    #[serde(rename = "_id")]
    id: String,
    agent_id: &'static str,
    timestamp: String,
    batch_time: String,
    event_type: &'static str,
    severity: &'static str,
    user: &'static str,
    process: &'static str,
    source: &'static str,
    source_ip: String,
    hostname: &'static str,
    message: String,
    command: String,
    raw_log: String,
}

fn pick<const N: usize>(rng: &mut StdRng, items: &[&'static str; N]) -> &'static str {
    items[rng.gen_range(0..N)]
}

// 40% low, 35% medium, 17% high, 8% critical
fn weighted_severity(rng: &mut StdRng) -> &'static str {
    match rng.gen_range(0..100) {
        0..=39 => "low",
        40..=74 => "medium",
        75..=91 => "high",
        _ => "critical",
    }
}

/// `count` events from a seeded RNG: the same seed yields the same events
/// relative to `now`.
pub fn generate_events(count: usize, seed: u64, now: DateTime<Utc>) -> Vec<Value> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = now.with_timezone(&Local);
    let batch_time = now.to_rfc3339_opts(SecondsFormat::Secs, false);

    (0..count)
        .filter_map(|_| {
            let ago = Duration::hours(rng.gen_range(0..24))
                + Duration::minutes(rng.gen_range(0..60))
                + Duration::seconds(rng.gen_range(0..60));
            let at = now - ago;

            let event_type = pick(&mut rng, &EVENT_TYPES);
            let mut severity = weighted_severity(&mut rng);
            let user = pick(&mut rng, &USERS);
            let process = pick(&mut rng, &PROCESSES);
            let ip = format!("192.168.{}.{}", rng.gen_range(0..256), rng.gen_range(0..256));
            let port = 1024 + rng.gen_range(0..64000);

            let (message, command) = match event_type {
                "user_login" => {
                    let m = format!("Accepted password for {user} from {ip} port {port} ssh2");
                    (m.clone(), m)
                }
                "auth_failure" => {
                    severity = "high";
                    let m = format!("Failed password for {user} from {ip} port {port} ssh2");
                    (m.clone(), m)
                }
                "system_event" => (
                    format!("System event: service {process} status changed to running"),
                    format!("systemctl status {process}"),
                ),
                "file_access" => (
                    format!("File access: {user} read {}", pick(&mut rng, &SENSITIVE_FILES)),
                    format!("cat {}", pick(&mut rng, &SENSITIVE_FILES)),
                ),
                "network_connection" => (
                    format!("New connection from {ip} to port {port} via {process}"),
                    format!("connect {ip}:{port}"),
                ),
                "process_start" => (
                    format!(
                        "Process {process} (PID {}) started by {user}",
                        1000 + rng.gen_range(0..50000)
                    ),
                    format!("/usr/bin/{process} --daemon"),
                ),
                "privilege_escalation" => {
                    severity = "high";
                    (
                        format!("{user} escalated privileges via sudo to execute /bin/bash"),
                        format!(
                            "{user} : TTY=pts/0 ; PWD=/home/{user} ; USER=root ; COMMAND=/bin/bash"
                        ),
                    )
                }
                _ => {
                    let file = pick(&mut rng, &CONFIG_FILES);
                    (
                        format!("Configuration file {file} modified by {user}"),
                        format!("vim {file}"),
                    )
                }
            };

            let hostname = pick(&mut rng, &HOSTNAMES);
            let raw_log = format!(
                "{} {hostname} {process}[{}]: {message}",
                at.format("%b %d %H:%M:%S"),
                1000 + rng.gen_range(0..50000)
            );
            let event = SampleEvent {
                id: format!(
                    "{}-{}",
                    at.timestamp_nanos_opt().unwrap_or_default(),
                    rng.gen_range(0..1_000_000)
                ),
                agent_id: pick(&mut rng, &AGENTS),
                timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, false),
                batch_time: batch_time.clone(),
                event_type,
                severity,
                user,
                process,
                source: pick(&mut rng, &SOURCES),
                source_ip: ip,
                hostname,
                message,
                command,
                raw_log,
            };
            serde_json::to_value(event).ok()
        })
        .collect()
}
