//! `ghwatch`: live terminal dashboard for a getter/executor status backend.
//!
//! Built on [ratatui](https://ratatui.rs) with surfaces published by
//! `ghwatch-core`'s [`Dashboard`]. Logs are written to a file (default
//! `/tmp/ghwatch.log`) to avoid corrupting the terminal UI.
//!
//! `--snapshot` skips the terminal entirely: one cycle is run and both
//! panels are printed to stdout as escaped HTML. `--save-profile` writes
//! the resolved flags into the config file as a named profile.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use ghwatch_config::{Config, Profile};
use ghwatch_core::render::markup;
use ghwatch_core::{CycleReport, Dashboard};

use crate::app::App;

/// Live status dashboard for getters and executors.
#[derive(Parser, Debug)]
#[command(name = "ghwatch", version, about)]
struct Cli {
    /// Backend base URL (e.g., http://127.0.0.1:8080)
    #[arg(short = 'u', long, env = "GHWATCH_URL")]
    url: Option<String>,

    /// Config profile to use (defaults to the file's default_profile)
    #[arg(short = 'p', long, env = "GHWATCH_PROFILE")]
    profile: Option<String>,

    /// Refresh interval in milliseconds: 0 (off), 1000, 2000, 5000, 10000, 30000
    #[arg(short = 'r', long)]
    refresh: Option<u64>,

    /// Language of placeholders and error text: en, ru
    #[arg(short = 'l', long)]
    language: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Out-of-order cycle policy: latest-dispatched, last-completed
    #[arg(long)]
    cycle_ordering: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Run one cycle, print both panels as HTML, and exit
    #[arg(long)]
    snapshot: bool,

    /// Store the resolved settings as a named profile in the config file, and exit
    #[arg(long, value_name = "NAME", conflicts_with = "snapshot")]
    save_profile: Option<String>,

    /// Log file path
    #[arg(long, default_value = "/tmp/ghwatch.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may be logged to stdout/stderr while
/// the terminal is in raw mode. The guard must be held until exit so logs
/// are flushed.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ghwatch={log_level},ghwatch_core={log_level},ghwatch_api={log_level}"
        ))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("ghwatch.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    guard
}

/// Merge CLI flags over the selected profile. Priority: CLI flags >
/// profile > defaults.
fn resolve_profile(cli: &Cli, cfg: &Config) -> Result<Profile> {
    let mut profile = match cfg.profile(cli.profile.as_deref()) {
        Ok((_, profile)) => profile.clone(),
        Err(e) if cli.profile.is_some() => return Err(e.into()),
        Err(_) => Profile::default(),
    };

    if let Some(url) = &cli.url {
        profile.url.clone_from(url);
    }
    if profile.url.is_empty() {
        bail!(
            "no backend URL: pass --url, set GHWATCH_URL, or add a profile to {}",
            ghwatch_config::config_path().display()
        );
    }
    if cli.refresh.is_some() {
        profile.refresh_ms = cli.refresh;
    }
    if cli.language.is_some() {
        profile.language.clone_from(&cli.language);
    }
    if cli.timeout.is_some() {
        profile.timeout = cli.timeout;
    }
    if cli.cycle_ordering.is_some() {
        profile.cycle_ordering.clone_from(&cli.cycle_ordering);
    }
    if cli.insecure {
        profile.insecure = Some(true);
    }
    Ok(profile)
}

/// Validate the resolved profile, store it under `name` and write the
/// config file. The first saved profile becomes the default.
fn save_profile(cli: &Cli, mut cfg: Config, name: &str) -> Result<()> {
    let profile = resolve_profile(cli, &cfg)?;
    ghwatch_config::profile_to_dashboard_config(&profile, &cfg.defaults)?;

    if cfg.profiles.is_empty() {
        cfg.default_profile = Some(name.to_owned());
    }
    cfg.profiles.insert(name.to_owned(), profile);
    ghwatch_config::save_config(&cfg)?;

    let path = ghwatch_config::config_path();
    info!(profile = name, path = %path.display(), "profile saved");
    println!("Saved profile '{name}' to {}", path.display());
    Ok(())
}

/// One cycle, printed as HTML. A failed cycle still prints its error
/// panels, then exits non-zero.
async fn run_snapshot(dashboard: &Dashboard) -> Result<()> {
    let report = dashboard.run_cycle().await;
    let surface = dashboard.current_surface();
    println!(
        "{}",
        markup::render_surface(&surface, dashboard.config().language)
    );

    if let CycleReport::Failed { message, .. } = report {
        bail!(message);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let cfg = ghwatch_config::load_config()?;
    if let Some(name) = &cli.save_profile {
        return save_profile(&cli, cfg, name);
    }

    let profile = resolve_profile(&cli, &cfg)?;
    let config = ghwatch_config::profile_to_dashboard_config(&profile, &cfg.defaults)?;
    info!(
        url = %config.base_url,
        refresh = %config.refresh_interval,
        snapshot = cli.snapshot,
        "starting ghwatch"
    );

    let dashboard = Dashboard::new(config)?;

    if cli.snapshot {
        return run_snapshot(&dashboard).await;
    }

    let mut app = App::new(dashboard);
    app.run().await?;

    Ok(())
}
