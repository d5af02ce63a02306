//! Murmur application binary - composition root.
//!
//! 1. Parse the command line and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open the SQLite database under the data directory
//! 4. Run the requested command: serve the API, or register a user

mod cli;

use std::sync::Arc;

use clap::Parser;

use murmur_api::auth::register_user;
use murmur_api::{start_server, AppState};
use murmur_core::config::MurmurConfig;
use murmur_storage::Database;

use crate::cli::{expand_home, CliArgs, Command};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config_file = args.resolve_config_path();
    let loaded = MurmurConfig::load(&config_file);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => MurmurConfig::default(),
    };
    args.apply(&mut config);

    init_tracing(&config.general.log_level);
    tracing::info!("Starting Murmur v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(_) => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Err(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    let data_dir = expand_home(&config.general.data_dir);
    let db_path = data_dir.join("murmur.db");
    let db = Database::new(&db_path)?;

    match args.command() {
        Command::Serve => {
            let state = AppState::new(config, db);
            start_server(state).await?;
        }
        Command::AddUser { name } => {
            let (user, token) = register_user(Arc::new(db), &name)?;
            println!("Created user '{}' ({})", user.name, user.id);
            println!("Bearer token: {}", token);
        }
    }

    Ok(())
}
