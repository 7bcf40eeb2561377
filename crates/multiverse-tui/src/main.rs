//! `multiverse` — terminal browser for the Rick and Morty character catalog.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `multiverse-core`'s [`CatalogController`](multiverse_core::CatalogController).
//! The list screen scrolls through the paginated catalog and loads further
//! pages on demand; `/` searches by character id; Enter opens a detail view.
//!
//! Logs are written to a file (default `multiverse.log` in the system temp
//! directory, overridable via `--log-file` or the config file) to avoid
//! corrupting the terminal UI. A background data bridge task forwards every
//! list snapshot from the controller into the TUI action loop.
//!
//! Entry point: CLI argument parsing, tracing setup, panic hooks, and app launch.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use multiverse_api::CatalogClient;
use multiverse_config::Config;
use multiverse_core::CatalogController;

use crate::app::App;

/// Terminal browser for the Rick and Morty character catalog.
#[derive(Parser, Debug)]
#[command(name = "multiverse", version, about)]
struct Cli {
    /// Catalog API base URL (defaults to the public API)
    #[arg(short = 'u', long, env = "MULTIVERSE_BASE_URL")]
    base_url: Option<String>,

    /// Log file path (defaults to the config value, then the system temp dir)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    save_config: bool,
}

/// Resolve the log file. Priority: CLI flag > config file > temp dir default.
fn resolve_log_file(cli: &Cli, config: &Config) -> PathBuf {
    cli.log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(|| std::env::temp_dir().join("multiverse.log"))
}

/// Set up file-based tracing. We MUST NOT log to stdout/stderr — that would
/// corrupt the TUI output. Returns a guard that must be held for the
/// lifetime of the application to ensure logs are flushed.
fn setup_tracing(log_file: &Path, verbose: u8) -> WorkerGuard {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "multiverse_tui={log_level},multiverse_core={log_level},multiverse_api={log_level}"
        ))
    });

    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(std::env::temp_dir, Path::to_path_buf);
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("multiverse.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Load config and apply CLI overrides. Priority: CLI flag > config file >
/// built-in default.
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = multiverse_config::load_config_or_default();
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.clone();
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config
        .validate()
        .map_err(|e| eyre!("invalid configuration: {e}"))?;
    Ok(config)
}

fn build_controller(config: &Config) -> Result<CatalogController> {
    let client = CatalogClient::new(&config.base_url, &config.transport())
        .map_err(|e| eyre!("failed to build API client: {e}"))?;
    Ok(CatalogController::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Install panic/error hooks BEFORE entering the terminal
    tui::install_hooks()?;

    let config = effective_config(&cli)?;

    if cli.save_config {
        let path = multiverse_config::save_config(&config)
            .map_err(|e| eyre!("failed to save config: {e}"))?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    // Tracing to file — hold the guard so logs flush on exit
    let log_file = resolve_log_file(&cli, &config);
    let _log_guard = setup_tracing(&log_file, cli.verbose);

    info!(
        base_url = %config.base_url,
        log_file = %log_file.display(),
        "starting multiverse"
    );

    let controller = build_controller(&config)?;
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cli(log_file: Option<&str>) -> Cli {
        Cli {
            base_url: None,
            log_file: log_file.map(PathBuf::from),
            verbose: 0,
            save_config: false,
        }
    }

    #[test]
    fn cli_log_file_wins_over_config() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/log/from-config.log")),
            ..Config::default()
        };
        assert_eq!(
            resolve_log_file(&cli(Some("/var/log/from-cli.log")), &config),
            PathBuf::from("/var/log/from-cli.log")
        );
    }

    #[test]
    fn config_log_file_applies_without_a_cli_flag() {
        let config = Config {
            log_file: Some(PathBuf::from("/var/log/from-config.log")),
            ..Config::default()
        };
        assert_eq!(
            resolve_log_file(&cli(None), &config),
            PathBuf::from("/var/log/from-config.log")
        );
    }

    #[test]
    fn log_file_falls_back_to_the_temp_dir() {
        assert_eq!(
            resolve_log_file(&cli(None), &Config::default()),
            std::env::temp_dir().join("multiverse.log")
        );
    }
}
