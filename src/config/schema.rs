//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// bcrypt accepts costs in this range
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Upper bound for token lifetimes (ten years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Config {
    /// Check settings that must hold before the server starts
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()
    }
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to send credentials. An empty list allows any
    /// origin without credentials, so the refresh cookie is not sent cross-origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Token, password and login throttling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub access_token_secret: String,

    #[serde(default)]
    pub refresh_token_secret: String,

    /// Access token lifetime, e.g. "15m"
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl: String,

    /// Refresh token lifetime, e.g. "7d"
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl: String,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Mark the refresh cookie `Secure`
    #[serde(default)]
    pub secure_cookies: bool,

    /// Require the presented refresh token to equal the stored one
    #[serde(default = "default_strict_refresh")]
    pub strict_refresh: bool,

    #[serde(default = "default_login_max_attempts")]
    pub login_max_attempts: usize,

    #[serde(default = "default_login_window_secs")]
    pub login_window_secs: u64,
}

fn default_access_ttl() -> String {
    "15m".to_string()
}

fn default_refresh_ttl() -> String {
    "7d".to_string()
}

fn default_bcrypt_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

fn default_strict_refresh() -> bool {
    true
}

fn default_login_max_attempts() -> usize {
    5
}

fn default_login_window_secs() -> u64 {
    600
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_ttl: default_access_ttl(),
            refresh_token_ttl: default_refresh_ttl(),
            bcrypt_cost: default_bcrypt_cost(),
            secure_cookies: false,
            strict_refresh: default_strict_refresh(),
            login_max_attempts: default_login_max_attempts(),
            login_window_secs: default_login_window_secs(),
        }
    }
}

impl AuthConfig {
    pub fn access_ttl(&self) -> Result<Duration> {
        parse_duration(&self.access_token_ttl)
    }

    pub fn refresh_ttl(&self) -> Result<Duration> {
        parse_duration(&self.refresh_token_ttl)
    }

    pub fn login_window(&self) -> Duration {
        Duration::from_secs(self.login_window_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token_secret.trim().is_empty() {
            return Err(Error::Config("auth.access_token_secret is not set".to_string()));
        }
        if self.refresh_token_secret.trim().is_empty() {
            return Err(Error::Config("auth.refresh_token_secret is not set".to_string()));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(Error::Config(
                "access and refresh token secrets must differ".to_string(),
            ));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST
            )));
        }
        for ttl in [self.access_ttl()?, self.refresh_ttl()?] {
            if ttl.is_zero() {
                return Err(Error::Config("token lifetimes must be positive".to_string()));
            }
            if ttl > MAX_TOKEN_TTL {
                return Err(Error::Config(format!(
                    "token lifetimes cannot exceed {} days",
                    MAX_TOKEN_TTL.as_secs() / 86_400
                )));
            }
        }
        Ok(())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string. Without one, records live in memory.
    #[serde(default)]
    pub url: Option<String>,
}

/// Parse a lifetime such as "30s", "15m", "12h", "7d" or a bare number of seconds
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let invalid = || Error::Config(format!("Invalid duration: '{}'", value));

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);
    let amount: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return Err(invalid()),
    };

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_auth() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access".to_string(),
            refresh_token_secret: "refresh".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("m").is_err());
        assert!(parse_duration("10w").is_err());
        assert!(parse_duration("-5m").is_err());
    }

    #[test]
    fn test_default_lifetimes() {
        let auth = AuthConfig::default();
        assert_eq!(auth.access_ttl().unwrap(), Duration::from_secs(15 * 60));
        assert_eq!(auth.refresh_ttl().unwrap(), Duration::from_secs(7 * 24 * 3600));
        assert!(auth.strict_refresh);
    }

    #[test]
    fn test_missing_secrets_fail_validation() {
        assert!(AuthConfig::default().validate().is_err());

        let mut auth = valid_auth();
        auth.refresh_token_secret.clear();
        assert!(auth.validate().is_err());
    }

    #[test]
    fn test_identical_secrets_fail_validation() {
        let mut auth = valid_auth();
        auth.refresh_token_secret = auth.access_token_secret.clone();
        assert!(auth.validate().is_err());
    }

    #[test]
    fn test_valid_auth_config() {
        assert!(valid_auth().validate().is_ok());
    }

    #[test]
    fn test_oversized_lifetimes_fail_validation() {
        let mut auth = valid_auth();
        auth.access_token_ttl = "200000000000000d".to_string();
        assert!(auth.validate().is_err());

        let mut auth = valid_auth();
        auth.refresh_token_ttl = format!("{}", i64::MAX as u64 + 1);
        assert!(auth.validate().is_err());

        let mut auth = valid_auth();
        auth.refresh_token_ttl = "3650d".to_string();
        assert!(auth.validate().is_ok());
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut auth = valid_auth();
        auth.bcrypt_cost = MIN_BCRYPT_COST;
        assert!(auth.validate().is_ok());
        auth.bcrypt_cost = MIN_BCRYPT_COST - 1;
        assert!(auth.validate().is_err());
        auth.bcrypt_cost = MAX_BCRYPT_COST + 1;
        assert!(auth.validate().is_err());
    }
}
