//! CLI command implementations

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::cli::{error, info, print_config_summary, success, warn};
use crate::config::{self, Config};
use crate::store::PostgresStore;

/// Initialize a new sketchroom.toml configuration file
pub async fn init(force: bool) -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() && !force {
        warn("sketchroom.toml already exists (use --force to overwrite)");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created sketchroom.toml");
    info("Set JWT_SECRET and REFRESH_SECRET, then run 'sketchroom serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(config_path: Option<&Path>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info(&format!(
        "Starting server at http://{}:{}",
        config.server.host, config.server.port
    ));

    // run_server validates the configuration before binding
    if let Err(e) = crate::api::run_server(config).await {
        error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

/// Apply the PostgreSQL schema
pub async fn migrate(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let Some(url) = config.database.url.as_deref().filter(|_| config.uses_postgres()) else {
        bail!("database.url is not set (set DATABASE_URL or [database] url)");
    };

    let store = PostgresStore::connect(url).await?;
    store.migrate().await?;
    success("Database schema is up to date");
    Ok(())
}

/// Validate configuration without starting anything
pub async fn check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print_config_summary(&config);

    match config.validate() {
        Ok(()) => {
            success("Configuration is valid");
            Ok(())
        }
        Err(e) => {
            error(&e.to_string());
            Err(e.into())
        }
    }
}

/// Helper to load config
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    config::load_config(config_path).map_err(|e| {
        error(&format!("Failed to load config: {}", e));
        e.into()
    })
}
