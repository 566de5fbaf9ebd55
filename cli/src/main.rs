use clap::Parser;
use colored::*;
use dotenvy::dotenv;
use log::LevelFilter;
use std::error::Error;
use std::sync::Arc;

mod app;
mod cli;
mod logging;
mod output;

use crate::app::App;
use crate::cli::Args;
use crate::logging::{log_error, log_info};

use jot_core::client::ApiClient;
use jot_core::config::{get_default_config_file, ClientConfig};
use jot_session::{FileStorage, MemoryStorage, SessionStore, SessionStorage};

/// Main function - boots the client and runs the interactive screen loop
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables first so they can feed the arg parser
    dotenv().ok();

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration; command-line flags take precedence
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => get_default_config_file("jot")?,
    };
    let mut config = ClientConfig::default().merge(&ClientConfig::load_from_file(&config_path)?);
    if let Some(server) = args.server.clone() {
        config.server_url = Some(server);
    }

    // Get log level from config or use default
    let log_level = config
        .log_level
        .as_deref()
        .map(|level| match level.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            _ => LevelFilter::Info,
        })
        .unwrap_or(LevelFilter::Info);
    let log_level = if args.verbose {
        LevelFilter::Debug
    } else {
        log_level
    };

    // Initialize logger with configured log level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.to_string()),
    )
    .init();

    let client = ApiClient::new(config.server_url());
    log_info(&format!("using note service at {}", client.base_url()));

    // Session storage: the durable file unless an ephemeral run was asked
    // for
    let storage: Arc<dyn SessionStorage> = if args.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        Arc::new(FileStorage::new(config.session_file()?))
    };

    // Restore any persisted session and hook up forced invalidation
    let session = SessionStore::new(client.clone(), storage);
    let restored = session.initialize();
    if let Some(identity) = restored.identity() {
        log_info(&format!("restored session for {}", identity.username));
    }

    let app = App::new(client, session);
    if let Err(e) = app.run().await {
        log_error(&format!("fatal: {e}"));
        eprintln!("{}", format!("Error: {e}").red());
        return Err(e.into());
    }

    Ok(())
}
