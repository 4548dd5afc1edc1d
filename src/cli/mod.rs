//! Command-line front end
//!
//! Wires the unblocker to file-backed storage and cookies under the state
//! directory, prints notifications to stderr and replies to stdout.

pub mod account;
pub mod localize;

use crate::{
    Settings, Unblocker,
    config::ConfigLoader,
    cookies::FileCookieJar,
    host::{ConsoleNotifier, ConsoleSignal, UnavailableCipher},
    storage::JsonFileStore,
    utils::version,
};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Options shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub state_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Load settings with precedence CLI > env > file > defaults
///
/// A config file that exists but can't be read or validated is an error;
/// falling back to defaults would silently drop its servers and login choice.
pub fn load_settings(args: &GlobalArgs) -> Result<Settings> {
    let config_path = args.config.clone().or_else(ConfigLoader::get_config_path);

    let mut settings = ConfigLoader::new()
        .load(config_path.as_deref())
        .context("Failed to load configuration")?;

    if let Some(state_dir) = &args.state_dir {
        settings.storage.state_dir = Some(state_dir.clone());
    }
    if args.verbose {
        settings.logging.verbose = true;
    }
    Ok(settings)
}

/// Install the global subscriber
///
/// `RUST_LOG` wins, then `--verbose` (debug), then the configured level.
pub fn init_logging(settings: &Settings) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if settings.logging.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(&settings.logging.level)
    };

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Directory holding `storage.json` and `cookies.json`
pub fn state_dir(settings: &Settings) -> PathBuf {
    settings
        .storage
        .state_dir
        .clone()
        .unwrap_or_else(ConfigLoader::default_state_dir)
}

/// Build an unblocker backed by files in the state directory
pub fn build_unblocker(settings: Settings) -> Result<Unblocker> {
    let dir = state_dir(&settings);
    debug!(
        "cr-unblock v{} using state directory {:?}",
        version::get_version(),
        dir
    );

    Unblocker::builder(settings)
        .storage(Arc::new(JsonFileStore::in_dir(&dir)))
        .cookies(Arc::new(FileCookieJar::in_dir(&dir)))
        .notifier(Arc::new(ConsoleNotifier))
        .page_signal(Arc::new(ConsoleSignal))
        .cipher(Arc::new(UnavailableCipher))
        .build()
        .context("Invalid configuration")
}

/// Print a reply as one line of JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
