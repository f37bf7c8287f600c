//! Server configuration.
//!
//! Loaded from a TOML file when one exists, otherwise every section falls
//! back to its `Default`. The token signing secret can always be overridden
//! with the `SIGNCOACH_AUTH_SECRET` environment variable so it never has to
//! live in a checked-in config file.

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub inference: InferenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. Created on first run.
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "signcoach.db".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for token signing.
    pub secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-change-me".into(),
            token_ttl_hours: 24 * 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Base URL of the sign-recognition service.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".into(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load from `path` if it exists, otherwise return defaults. Env
    /// overrides are applied either way.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(secret) = std::env::var("SIGNCOACH_AUTH_SECRET") {
            config.auth.secret = secret;
        }

        if config.auth.secret == AuthConfig::default().secret {
            tracing::warn!("using the default auth secret; set SIGNCOACH_AUTH_SECRET in production");
        }

        Ok(config)
    }
}
