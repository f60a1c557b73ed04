//! Configuration for the access-control and versioning core.
//!
//! Loaded from an optional TOML file with environment variable
//! overrides, validated before use.

use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Broadcast fan-out configuration.
    pub broadcast: BroadcastConfig,

    /// Version ledger configuration.
    pub history: HistoryConfig,

    /// Soft-delete retention configuration.
    pub retention: RetentionConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Broadcast fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Per-connection send queue length. Messages beyond this are
    /// dropped for that peer rather than blocking fan-out.
    pub send_queue: usize,
}

/// Version ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Bound on version-collision retries before `Conflict` surfaces.
    pub append_attempts: u32,

    /// Maximum records a single history replay returns.
    pub max_replay: usize,
}

/// Soft-delete retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Days a soft-deleted workspace lingers before the purge sweep
    /// hard-deletes it.
    pub purge_grace_days: i64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log format (json, pretty).
    pub format: String,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self { send_queue: 64 }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            append_attempts: 3,
            max_replay: 1_000,
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            purge_grace_days: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and config file.
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(file_config) = Self::from_file("hive.toml") {
            config = file_config;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_input(format!("failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::invalid_input(format!("failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<()> {
        use std::env;

        if let Ok(queue) = env::var("HIVE_SEND_QUEUE") {
            self.broadcast.send_queue = queue
                .parse()
                .map_err(|e| Error::invalid_input(format!("invalid send queue: {}", e)))?;
        }

        if let Ok(attempts) = env::var("HIVE_APPEND_ATTEMPTS") {
            self.history.append_attempts = attempts
                .parse()
                .map_err(|e| Error::invalid_input(format!("invalid append attempts: {}", e)))?;
        }

        if let Ok(max_replay) = env::var("HIVE_MAX_REPLAY") {
            self.history.max_replay = max_replay
                .parse()
                .map_err(|e| Error::invalid_input(format!("invalid max replay: {}", e)))?;
        }

        if let Ok(days) = env::var("HIVE_PURGE_GRACE_DAYS") {
            self.retention.purge_grace_days = days
                .parse()
                .map_err(|e| Error::invalid_input(format!("invalid purge grace days: {}", e)))?;
        }

        if let Ok(level) = env::var("HIVE_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = env::var("HIVE_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.broadcast.send_queue == 0 {
            return Err(Error::invalid_input("send queue must be at least 1"));
        }

        if self.history.append_attempts == 0 {
            return Err(Error::invalid_input("append attempts must be at least 1"));
        }

        if self.history.max_replay == 0 {
            return Err(Error::invalid_input("max replay must be at least 1"));
        }

        if self.retention.purge_grace_days < 0 {
            return Err(Error::invalid_input("purge grace days must not be negative"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::invalid_input("invalid log level")),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            _ => return Err(Error::invalid_input("invalid log format")),
        }

        Ok(())
    }

    /// Retention grace period as a duration.
    pub fn purge_grace(&self) -> chrono::Duration {
        chrono::Duration::days(self.retention.purge_grace_days)
    }
}
