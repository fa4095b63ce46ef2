//! CLI arg parsing tests for siemtop (client)
use std::process::Command;

fn run(args: &[&str]) -> (bool, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_siemtop"))
        .args(args)
        .env("XDG_CONFIG_HOME", std::env::temp_dir().join("siemtop-cli-args"))
        .env_remove("SIEMTOP_LOG")
        .output()
        .expect("run siemtop");
    let text = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    (output.status.success(), text)
}

#[test]
fn test_help_mentions_short_and_long_flags() {
    let (ok, text) = run(&["--help"]);
    assert!(ok);
    assert!(
        text.contains("--profile")
            && text.contains("-P")
            && text.contains("--user")
            && text.contains("-u")
            && text.contains("--demo"),
        "help text missing expected flags\n{text}"
    );
}

#[test]
fn test_flags_with_help_still_print_usage() {
    for args in [
        &["--profile", "dev", "--help"][..],
        &["-P", "dev", "--help"][..],
        &["-u", "analyst", "--help"][..],
    ] {
        let (ok, text) = run(args);
        assert!(ok, "{args:?} did not succeed");
        assert!(text.contains("Usage:"), "{args:?}: {text}");
    }
}

#[test]
fn test_dry_run_resolves_url_without_connecting() {
    let (ok, text) = run(&["--dry-run", "http://127.0.0.1:1"]);
    assert!(ok, "{text}");
    assert!(text.contains("http://127.0.0.1:1/api"), "{text}");
}

#[test]
fn test_demo_dry_run_targets_local_server() {
    let (ok, text) = run(&["--demo", "--dry-run"]);
    assert!(ok, "{text}");
    assert!(text.contains("http://127.0.0.1:3232/api"), "{text}");
}

#[test]
fn test_bad_url_fails() {
    let (ok, text) = run(&["--dry-run", "not a url"]);
    assert!(!ok);
    assert!(text.contains("invalid server url"), "{text}");
}

#[test]
fn test_extra_positional_rejected() {
    let (_ok, text) = run(&["http://a:1", "http://b:2"]);
    assert!(text.contains("Unexpected argument"), "{text}");
}
