//! Dictation shell: hosts the per-window session state of a dictation
//! front end and keeps it in sync with the transcription backend.
//!
//! Speaks JSON lines on stdin/stdout with the host process; logs go to
//! stderr.

mod app;
mod app_command;
mod config;
mod error;
mod host;
mod preference_store;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    preference_store::ConfigPreferenceStore,
};

use crate::{
    config::{Config, DEFAULT_LOG_FILTER, LoggingConfig},
    host::{COMMAND_TIMEOUT, HostChannel},
};

use dictation_core::{PreferenceTransaction, ShortcutPreference};

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Application entry point.
fn main() {
    let loaded = Config::config_path().and_then(|path| {
        let config = Config::load_or_create(&path)?;
        Ok((path, config))
    });

    let logging = match &loaded {
        Ok((_, config)) => config.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    init_logging(&logging);

    let (config_path, config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, config_path = ?config_path, "Configuration ready");

    rt.block_on(async {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (host, host_tasks) = HostChannel::start(
            tokio::io::stdin(),
            tokio::io::stdout(),
            command_tx,
            COMMAND_TIMEOUT,
        );

        let store = Arc::new(ConfigPreferenceStore::new(config_path));
        let transaction = PreferenceTransaction::new(host.clone(), store);

        let app = App {
            host,
            host_tasks,
            transaction,
            preference: ShortcutPreference::from(&config.shortcut),
            delays: config.overlay.delays(),
            command_rx,
        };

        if let Err(e) = app.run().await {
            error!(error = ?e, "App error");
        }
    });

    // Stdin reads block a runtime thread until the host writes or closes.
    rt.shutdown_background();
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(&logging.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
