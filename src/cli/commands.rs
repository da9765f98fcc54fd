//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::api;
use crate::cli::{error, field, info, redact, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME, Config};
use crate::error::Error;

/// Initialize a new clarity.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn("clarity.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created clarity.toml");
    info("Set ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET, then run 'clarity serve'");

    Ok(())
}

/// Start the API server
pub async fn serve(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    if let Err(e) = config.validate() {
        error(&e.to_string());
        return Err(e.into());
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    info(&format!("Starting Clarity API on http://{}:{}", host, port));

    api::run_server(config, &host, port).await?;
    Ok(())
}

/// Validate configuration and print the effective settings
pub async fn check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    info("Effective configuration");
    field("server", &format!("{}:{}", config.server.host, config.server.port));
    field("access token secret", &redact(&config.auth.access_token_secret));
    field("refresh token secret", &redact(&config.auth.refresh_token_secret));
    field("access token ttl", &config.auth.access_token_ttl);
    field("refresh token ttl", &config.auth.refresh_token_ttl);
    field("bcrypt cost", &config.auth.bcrypt_cost.to_string());
    field("strict refresh", &config.auth.strict_refresh.to_string());
    field(
        "login limit",
        &format!(
            "{} per {}s",
            config.auth.login_max_attempts, config.auth.login_window_secs
        ),
    );
    field(
        "database",
        if config.database.url.is_some() { "postgres" } else { "memory" },
    );

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

/// Explicit path, then clarity.toml found upward, then environment only
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_path {
        return Ok(config::load_config_from_path(path)?);
    }

    match config::load_config() {
        Ok(config) => Ok(config),
        Err(Error::ConfigNotFound) => {
            warn("No clarity.toml found, using environment variables only");
            Ok(config::config_from_env())
        }
        Err(e) => Err(e.into()),
    }
}
