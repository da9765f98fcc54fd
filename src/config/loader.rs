//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "clarity.toml";

/// Load configuration from clarity.toml, then apply environment overrides
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let content = interpolate_env_vars(&content);
    let mut config: Config = toml::from_str(&content)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Build a configuration purely from the environment, for deployments without a file
pub fn config_from_env() -> Config {
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    config
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Well-known environment variables take precedence over the file
fn apply_env_overrides(config: &mut Config) {
    let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

    if let Some(secret) = var("ACCESS_TOKEN_SECRET") {
        config.auth.access_token_secret = secret;
    }
    if let Some(secret) = var("REFRESH_TOKEN_SECRET") {
        config.auth.refresh_token_secret = secret;
    }
    if let Some(ttl) = var("ACCESS_TOKEN_EXPIRES") {
        config.auth.access_token_ttl = ttl;
    }
    if let Some(ttl) = var("REFRESH_TOKEN_EXPIRES") {
        config.auth.refresh_token_ttl = ttl;
    }
    if let Some(url) = var("DATABASE_URL") {
        config.database.url = Some(url);
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // Constant pattern
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Clarity Configuration

[server]
host = "0.0.0.0"
port = 5000
cors_origins = ["http://localhost:3000", "http://localhost:3001"]

[auth]
access_token_secret = "${ACCESS_TOKEN_SECRET}"
refresh_token_secret = "${REFRESH_TOKEN_SECRET}"
access_token_ttl = "${ACCESS_TOKEN_EXPIRES:-15m}"
refresh_token_ttl = "${REFRESH_TOKEN_EXPIRES:-7d}"
bcrypt_cost = 12
secure_cookies = false
# Reject refresh tokens that no longer match the one stored for the user
strict_refresh = true
login_max_attempts = 5
login_window_secs = 600

[database]
# Leave unset to keep records in memory
# url = "${DATABASE_URL}"
"#
}
