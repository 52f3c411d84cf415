//! # Service Configuration
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual keys. Every key has a default, so the service starts
//! with no file at all.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:8001"
//! cors_origins = ["https://hillia.example"]
//!
//! [admin]
//! username = "hillia_admin"
//! password_hash = "<sha256 hex digest>"
//!
//! [auth]
//! max_failed_attempts = 5
//! lockout_secs = 300
//! ```
//!
//! ## Environment overrides
//!
//! - `HILLIA_BIND`
//! - `CORS_ORIGINS` (comma separated)
//! - `ADMIN_USERNAME`
//! - `ADMIN_PASSWORD_HASH`
//!
//! Leaving the admin username or hash unset is a valid deployment: the
//! admin API then answers 503 to everything.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{CredentialError, LOCKOUT_DURATION, LockoutPolicy, MAX_FAILED_ATTEMPTS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid bind address '{0}'")]
    BindAddress(String),
    #[error("Invalid admin credentials: {0}")]
    Credentials(#[from] CredentialError),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// `["*"]` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// The one admin identity. Both fields must be set for the admin API to work.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub username: Option<String>,
    /// Hex SHA-256 of the admin password.
    #[serde(default)]
    pub password_hash: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
    /// How often expired lockout records are swept from memory.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            lockout_secs: default_lockout_secs(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

impl AuthConfig {
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_failed_attempts: self.max_failed_attempts,
            lockout_duration: Duration::from_secs(self.lockout_secs),
        }
    }

    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs.max(1))
    }
}

fn default_bind() -> String { "0.0.0.0:8001".to_string() }
fn default_cors_origins() -> Vec<String> { vec!["*".to_string()] }
fn default_max_failed_attempts() -> u32 { MAX_FAILED_ATTEMPTS }
fn default_lockout_secs() -> u64 { LOCKOUT_DURATION.as_secs() }
fn default_purge_interval_secs() -> u64 { 60 }

impl Config {
    /// Applies environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(bind) = lookup("HILLIA_BIND") {
            self.server.bind = bind;
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(username) = lookup("ADMIN_USERNAME") {
            self.admin.username = Some(username);
        }
        if let Some(hash) = lookup("ADMIN_PASSWORD_HASH") {
            self.admin.password_hash = Some(hash);
        }
        self
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::BindAddress(self.server.bind.clone()))
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path.display(), e);
            Err(ConfigError::Io(e))
        }
    }
}

/// Defaults or the given file, then the process environment on top.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.server.bind, "0.0.0.0:8001");
        assert_eq!(config.server.cors_origins, vec!["*"]);
        assert!(config.admin.username.is_none());
        assert!(config.admin.password_hash.is_none());
        assert_eq!(config.auth.lockout_policy(), LockoutPolicy::default());
        assert_eq!(config.auth.purge_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("hillia.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(
            file,
            "[admin]\nusername = 'hillia_admin'\n\n[auth]\nlockout_secs = 60"
        )
        .unwrap();
        file.flush().unwrap();
        let config = load_config(&file_path).unwrap();
        assert_eq!(config.admin.username.as_deref(), Some("hillia_admin"));
        assert_eq!(config.auth.lockout_secs, 60);
        // Defaults for missing fields
        assert_eq!(config.auth.max_failed_attempts, 5);
        assert_eq!(config.server.bind, "0.0.0.0:8001");
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config(Path::new("nonexistent_file.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(&file_path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env = HashMap::from([
            ("ADMIN_USERNAME", "from_env"),
            ("ADMIN_PASSWORD_HASH", "abc123"),
            ("CORS_ORIGINS", "https://a.example, https://b.example,"),
            ("HILLIA_BIND", "127.0.0.1:9000"),
        ]);
        let mut config = Config::default();
        config.admin.username = Some("from_file".to_string());

        let config = config.with_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.admin.username.as_deref(), Some("from_env"));
        assert_eq!(config.admin.password_hash.as_deref(), Some("abc123"));
        assert_eq!(
            config.server.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.bind_addr().unwrap().port(), 9000);
    }

    #[test]
    fn test_absent_env_keeps_config() {
        let config = Config::default().with_env_overrides(|_| None);
        assert!(config.admin.username.is_none());
        assert_eq!(config.server.cors_origins, vec!["*"]);
    }

    #[test]
    fn test_invalid_bind_address() {
        let mut config = Config::default();
        config.server.bind = "not-an-address".to_string();
        assert!(matches!(config.bind_addr(), Err(ConfigError::BindAddress(_))));
    }

    #[test]
    fn test_debug_redacts_password_hash() {
        let admin = AdminConfig {
            username: Some("hillia_admin".to_string()),
            password_hash: Some("deadbeef".to_string()),
        };
        let rendered = format!("{:?}", admin);
        assert!(!rendered.contains("deadbeef"));
        assert!(rendered.contains("<redacted>"));
    }
}
