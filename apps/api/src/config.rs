//! # API Configuration
//!
//! Configuration management for the HTTP server.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     NIAGA_PORT=8080                                                    │
//! │     NIAGA_JWT_SECRET=...                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/niaga/niaga.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.niaga.api/niaga.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # niaga.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "/var/lib/niaga/niaga.db"
//! max_connections = 5
//!
//! [auth]
//! jwt_secret = "change-me"
//! token_lifetime_secs = 86400
//!
//! [sales]
//! due_days = 7
//! write_timeout_ms = 5000
//! utc_offset_minutes = 480  # +08:00
//! ```

use std::path::PathBuf;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use niaga_core::DEFAULT_DUE_DAYS;

/// Secret used when nothing else is configured. Fine for local runs only.
const DEV_JWT_SECRET: &str = "niaga-dev-secret";

/// ±14 hours, the widest offset in use anywhere.
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// One year.
const MAX_TOKEN_LIFETIME_SECS: i64 = 366 * 24 * 60 * 60;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Returns the full bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_token_lifetime")]
    pub token_lifetime_secs: i64,
}

fn default_jwt_secret() -> String {
    DEV_JWT_SECRET.to_string()
}

fn default_token_lifetime() -> i64 {
    24 * 60 * 60
}

impl Default for AuthSettings {
    fn default() -> Self {
        AuthSettings {
            jwt_secret: default_jwt_secret(),
            token_lifetime_secs: default_token_lifetime(),
        }
    }
}

/// Sale creation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesSettings {
    /// Days from transaction date to the default due date.
    #[serde(default = "default_due_days")]
    pub due_days: i64,

    /// Upper bound on one sale write, in milliseconds.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_ms: u64,

    /// Business timezone used for invoice MMYY and plain-date inputs.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_due_days() -> i64 {
    DEFAULT_DUE_DAYS
}

fn default_write_timeout() -> u64 {
    5_000
}

fn default_utc_offset() -> i32 {
    8 * 60
}

impl Default for SalesSettings {
    fn default() -> Self {
        SalesSettings {
            due_days: default_due_days(),
            write_timeout_ms: default_write_timeout(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

// =============================================================================
// ApiConfig
// =============================================================================

/// Complete server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub sales: SalesSettings,
}

impl ApiConfig {
    /// Loads configuration: defaults, then the TOML file, then environment.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("Using the built-in development JWT secret; set NIAGA_JWT_SECRET");
        }

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }

        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::Invalid(
                "auth.token_lifetime_secs must be positive".into(),
            ));
        }

        if self.auth.token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(ConfigError::Invalid(format!(
                "auth.token_lifetime_secs must be at most {}, got {}",
                MAX_TOKEN_LIFETIME_SECS, self.auth.token_lifetime_secs
            )));
        }

        if self.sales.due_days <= 0 {
            return Err(ConfigError::Invalid("sales.due_days must be positive".into()));
        }

        if self.sales.write_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "sales.write_timeout_ms must be positive".into(),
            ));
        }

        if self.sales.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "sales.utc_offset_minutes must be within ±{}, got {}",
                MAX_OFFSET_MINUTES, self.sales.utc_offset_minutes
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `NIAGA_*` overrides from `lookup`. Unparseable numbers are
    /// logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("NIAGA_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(port) = lookup("NIAGA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid NIAGA_PORT"),
            }
        }

        if let Some(path) = lookup("NIAGA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(secret) = lookup("NIAGA_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }

        if let Some(secs) = lookup("NIAGA_TOKEN_LIFETIME_SECS") {
            match secs.parse::<i64>() {
                Ok(v) => self.auth.token_lifetime_secs = v,
                Err(_) => warn!(value = %secs, "Ignoring invalid NIAGA_TOKEN_LIFETIME_SECS"),
            }
        }

        if let Some(days) = lookup("NIAGA_DUE_DAYS") {
            match days.parse::<i64>() {
                Ok(v) => self.sales.due_days = v,
                Err(_) => warn!(value = %days, "Ignoring invalid NIAGA_DUE_DAYS"),
            }
        }

        if let Some(ms) = lookup("NIAGA_WRITE_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.sales.write_timeout_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring invalid NIAGA_WRITE_TIMEOUT_MS"),
            }
        }

        if let Some(minutes) = lookup("NIAGA_UTC_OFFSET_MINUTES") {
            match minutes.parse::<i32>() {
                Ok(v) => self.sales.utc_offset_minutes = v,
                Err(_) => warn!(value = %minutes, "Ignoring invalid NIAGA_UTC_OFFSET_MINUTES"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "niaga", "api")
            .map(|dirs| dirs.config_dir().join("niaga.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Business timezone. Falls back to UTC if the offset is out of range,
    /// which `validate` already rules out.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.sales.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.sales.write_timeout_ms)
    }

    /// Configured database file, or `niaga.db` in the platform data dir.
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            directories::ProjectDirs::from("com", "niaga", "api")
                .map(|dirs| dirs.data_dir().join("niaga.db"))
                .unwrap_or_else(|| PathBuf::from("niaga.db"))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
