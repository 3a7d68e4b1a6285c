//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Secrets shorter than this are accepted but logged as weak
pub const RECOMMENDED_SECRET_LEN: usize = 32;

/// Cost range bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

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

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    #[serde(default)]
    pub access_secret: String,

    /// HMAC secret for refresh tokens, must differ from `access_secret`
    #[serde(default)]
    pub refresh_secret: String,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: i64,

    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: i64,
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_access_ttl_secs() -> i64 {
    15 * 60
}

fn default_refresh_ttl_secs() -> i64 {
    7 * 24 * 60 * 60
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            bcrypt_cost: default_bcrypt_cost(),
            access_ttl_secs: default_access_ttl_secs(),
            refresh_ttl_secs: default_refresh_ttl_secs(),
        }
    }
}

// Keep secrets out of logs and `check` output.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &redact(&self.access_secret))
            .field("refresh_secret", &redact(&self.refresh_secret))
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

/// Relational store settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string; the in-memory store is used when absent
    #[serde(default)]
    pub url: Option<String>,

    /// Apply the schema when the server starts
    #[serde(default)]
    pub migrate: bool,
}

impl Config {
    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<()> {
        let auth = &self.auth;

        if auth.access_secret.trim().is_empty() {
            return Err(Error::Config(
                "auth.access_secret is not set (set JWT_SECRET or [auth] access_secret)".to_string(),
            ));
        }
        if auth.refresh_secret.trim().is_empty() {
            return Err(Error::Config(
                "auth.refresh_secret is not set (set REFRESH_SECRET or [auth] refresh_secret)"
                    .to_string(),
            ));
        }
        if auth.access_secret == auth.refresh_secret {
            return Err(Error::Config(
                "auth.access_secret and auth.refresh_secret must differ".to_string(),
            ));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST,
                auth.bcrypt_cost
            )));
        }
        if auth.access_ttl_secs <= 0 || auth.refresh_ttl_secs <= 0 {
            return Err(Error::Config(
                "token lifetimes must be positive".to_string(),
            ));
        }

        for (name, secret) in [
            ("access_secret", &auth.access_secret),
            ("refresh_secret", &auth.refresh_secret),
        ] {
            if secret.len() < RECOMMENDED_SECRET_LEN {
                tracing::warn!(
                    "auth.{} is shorter than {} bytes; use a longer random value in production",
                    name,
                    RECOMMENDED_SECRET_LEN
                );
            }
        }

        Ok(())
    }

    /// Whether a PostgreSQL store is configured
    pub fn uses_postgres(&self) -> bool {
        self.database
            .url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
