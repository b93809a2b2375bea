//! CLI module for the user hub
//!
//! Each subcommand runs one process role against the shared user store:
//! - `api`: HTTP server for user CRUD
//! - `consumer`: applies user events from the queue
//! - `cron`: periodic removal of inactive users

pub mod api;
pub mod consumer;
pub mod cron;

use clap::{Args, Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;

/// User hub - user records over HTTP, a message queue and a cleanup schedule
#[derive(Parser)]
#[command(name = "user-hub")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    #[command(visible_aliases = ["serve", "server"])]
    Api(ApiArgs),

    /// Consume user events from the queue
    #[command(visible_aliases = ["cons", "worker"])]
    Consumer(ConsumerArgs),

    /// Run the inactive-user cleanup schedule
    #[command(visible_aliases = ["scheduler", "jobs"])]
    Cron(CronArgs),
}

#[derive(Args, Debug, Default)]
pub struct ApiArgs {
    /// Port to listen on, overrides configuration
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Environment whose `config/{env}` file is loaded
    #[arg(short, long)]
    pub env: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ConsumerArgs {
    /// Queue to consume, overrides configuration
    #[arg(short, long)]
    pub queue: Option<String>,

    /// Environment whose `config/{env}` file is loaded
    #[arg(short, long)]
    pub env: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct CronArgs {
    /// Six-field cron expression, overrides configuration
    #[arg(short, long)]
    pub schedule: Option<String>,

    /// Environment whose `config/{env}` file is loaded
    #[arg(short, long)]
    pub env: Option<String>,
}

/// Loads `.env`, then configuration, then starts logging
///
/// A configuration that fails to load falls back to defaults.
fn bootstrap(env: Option<&str>) -> AppConfig {
    dotenvy::dotenv().ok();

    let loaded = match env {
        Some(env) => AppConfig::load_for_env(Some(env)),
        None => AppConfig::load(),
    };

    let (config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    init_logging(&config.logging);

    if let Some(e) = load_error {
        error!(error = %e, "Failed to load configuration, using defaults");
    }
    info!(env = %config.server.env, "Configuration loaded");

    config
}

/// Resolves on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that signal is never observed.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
