//! Entry point for the siemtop TUI. Parses args, resolves the server and runs the App.

use std::env;
use std::io::{self, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::{Child, Command};
use std::sync::Arc;
use std::time::{Duration, Instant};

use siemtop::api::ApiClient;
use siemtop::app::App;
use siemtop::logging;
use siemtop::nav::{Navigator, Route};
use siemtop::profiles::{load_profiles, save_profiles, ProfileEntry, ProfileRequest, ResolveProfile};
use siemtop::session::MemorySession;
use tracing::info;

const USAGE: &str =
    "[--profile NAME|-P NAME] [--save] [--demo] [--user NAME|-u NAME] [--dry-run] [http://HOST:PORT]";

const DEMO_PORT: u16 = 3232;

struct ParsedArgs {
    url: Option<String>,
    profile: Option<String>,
    user: Option<String>,
    save: bool,
    demo: bool,
    dry_run: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<ParsedArgs, String> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "siemtop".into());
    let mut url: Option<String> = None;
    let mut profile: Option<String> = None;
    let mut user: Option<String> = None;
    let mut save = false; // --save
    let mut demo = false; // --demo
    let mut dry_run = false; // --dry-run

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Err(format!("Usage: {prog} {USAGE}"));
            }
            "--profile" | "-P" => {
                profile = it.next();
            }
            "--user" | "-u" => {
                user = it.next();
            }
            "--save" => {
                save = true;
            }
            "--demo" => {
                demo = true;
            }
            "--dry-run" => {
                dry_run = true;
            }
            _ if arg.starts_with("--profile=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        profile = Some(v.to_string());
                    }
                }
            }
            _ if arg.starts_with("--user=") => {
                if let Some((_, v)) = arg.split_once('=') {
                    if !v.is_empty() {
                        user = Some(v.to_string());
                    }
                }
            }
            _ => {
                if url.is_none() {
                    url = Some(arg);
                } else {
                    return Err(format!("Unexpected argument. Usage: {prog} {USAGE}"));
                }
            }
        }
    }
    Ok(ParsedArgs {
        url,
        profile,
        user,
        save,
        demo,
        dry_run,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let parsed = match parse_args(env::args()) {
        Ok(v) => v,
        Err(msg) => {
            eprintln!("{msg}");
            return Ok(());
        }
    };

    if let Some(path) = logging::init()? {
        info!(log = %path.display(), "logging enabled");
    }

    // Demo mode short-circuit
    if parsed.demo || matches!(parsed.profile.as_deref(), Some("demo")) {
        return run_demo_mode(parsed.dry_run).await;
    }

    let profiles_file = load_profiles();
    let req = ProfileRequest {
        profile_name: parsed.profile.clone(),
        url: parsed.url.clone(),
        user: parsed.user.clone(),
    };
    let resolved = req.resolve(&profiles_file);

    let mut profiles_mut = profiles_file.clone();
    let entry: ProfileEntry = match resolved {
        ResolveProfile::Direct(entry) => {
            if let Some(name) = parsed.profile.as_ref() {
                match profiles_mut.profiles.get(name) {
                    None => {
                        // New profile: auto-save immediately
                        profiles_mut.profiles.insert(name.clone(), entry.clone());
                        let _ = save_profiles(&profiles_mut);
                    }
                    Some(existing) if *existing != entry => {
                        let overwrite = parsed.save
                            || prompt_yes_no(&format!(
                                "Overwrite existing profile '{name}'? [y/N]: "
                            ));
                        if overwrite {
                            profiles_mut.profiles.insert(name.clone(), entry.clone());
                            let _ = save_profiles(&profiles_mut);
                        }
                    }
                    Some(_) => {}
                }
            }
            entry
        }
        ResolveProfile::Loaded(entry) => entry,
        ResolveProfile::PromptSelect(mut names) => {
            if !names.iter().any(|n| n == "demo") {
                names.push("demo".into());
            }
            eprintln!("Select profile:");
            for (i, n) in names.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, n);
            }
            let line = prompt_string("Enter number (or blank to abort): ")?;
            let Some(name) = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| names.get(idx))
            else {
                return Ok(());
            };
            if name == "demo" {
                return run_demo_mode(parsed.dry_run).await;
            }
            match profiles_mut.profiles.get(name) {
                Some(entry) => entry.clone(),
                None => return Ok(()),
            }
        }
        ResolveProfile::PromptCreate(name) => {
            eprintln!("Profile '{name}' does not exist yet.");
            let url = prompt_string("Enter server URL (http://HOST:PORT): ")?;
            if url.trim().is_empty() {
                return Ok(());
            }
            let user = prompt_string("Enter username (or leave blank): ")?;
            let entry = ProfileEntry {
                url: url.trim().to_string(),
                user: Some(user.trim().to_string()).filter(|u| !u.is_empty()),
            };
            profiles_mut.profiles.insert(name, entry.clone());
            let _ = save_profiles(&profiles_mut);
            entry
        }
        ResolveProfile::None => {
            eprintln!("No URL provided and no profiles to select.");
            return Ok(());
        }
    };

    let api = build_client(&entry.url)?;
    if parsed.dry_run {
        println!("siemtop: would connect to {}", api.base_url());
        return Ok(());
    }

    let mut app = App::new(api, entry.user);
    app.run().await
}

fn build_client(url: &str) -> anyhow::Result<ApiClient> {
    let session = Arc::new(MemorySession::new());
    let nav = Navigator::new(Route::Login);
    Ok(ApiClient::new(url, session, nav)?)
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_ok() {
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn prompt_string(prompt: &str) -> io::Result<String> {
    eprint!("{prompt}");
    let _ = io::stderr().flush();
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line)
}

// --- Demo Mode ---

async fn run_demo_mode(dry_run: bool) -> anyhow::Result<()> {
    let url = format!("http://127.0.0.1:{DEMO_PORT}");
    let api = build_client(&url)?;
    if dry_run {
        println!("siemtop: would start the demo server and connect to {}", api.base_url());
        return Ok(());
    }
    let _guard = spawn_demo_server(DEMO_PORT)?;
    let mut app = App::new(api, Some("admin".into()));
    app.run().await
}

/// Kills the demo server when dropped.
struct DemoGuard(Child);

impl Drop for DemoGuard {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

fn spawn_demo_server(port: u16) -> anyhow::Result<DemoGuard> {
    let mut cmd = Command::new(find_demo_executable());
    cmd.arg("--port").arg(port.to_string());
    // keep the server's log lines off the TUI
    cmd.env("RUST_LOG", "off");
    let guard = DemoGuard(cmd.spawn()?);

    // Wait for the listener, up to a few seconds
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if TcpStream::connect(("127.0.0.1", port)).is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    Ok(guard)
}

fn find_demo_executable() -> PathBuf {
    if let Some(parent) = env::current_exe().ok().as_deref().and_then(|p| p.parent()) {
        #[cfg(windows)]
        let name = "siemtop_demo.exe";
        #[cfg(not(windows))]
        let name = "siemtop_demo";
        let candidate = parent.join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    // Fallback to relying on PATH
    PathBuf::from("siemtop_demo")
}
