//! Configuration management for the lineage visualizer
//!
//! This module handles all configuration settings: defaults, a TOML config
//! file, `LV_*` environment overrides, and validation.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Input table location
    pub data: DataConfig,

    /// Graph derivation options
    pub transform: TransformConfig,

    /// Diagnostics retention
    pub diagnostics: DiagnosticsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,

    /// Directory served under `/static`
    pub static_dir: PathBuf,

    /// Directory the index template is loaded from
    pub templates_dir: PathBuf,
}

/// Input table location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Primary CSV path
    pub path: PathBuf,

    /// Location tried when the primary path does not exist
    pub fallback_path: PathBuf,
}

/// Graph derivation options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// How many warehouse columns (in table order) are connected to the
    /// virtualisation layer in the "current" snapshot
    pub virtualise_first: usize,

    /// Emit advisory circle positions for warehouse nodes
    pub layout_hints: bool,
}

/// Diagnostics retention
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Maximum number of recent events kept in the ring buffer
    pub capacity: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            transform: TransformConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8000".parse().expect("valid default address"),
            static_dir: PathBuf::from("static"),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/legacy_data.csv"),
            fallback_path: PathBuf::from("legacy_data.csv"),
        }
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            virtualise_first: 4,
            layout_hints: true,
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
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
    /// Load configuration from the default config file and environment variables
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file first
        if let Ok(file_config) = Self::from_file("lineage-vis.toml") {
            config = file_config;
        }

        // Override with environment variables
        config.apply_env_overrides()?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        use std::env;

        if let Ok(addr) = env::var("LV_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Ok(dir) = env::var("LV_STATIC_DIR") {
            self.server.static_dir = PathBuf::from(dir);
        }

        if let Ok(dir) = env::var("LV_TEMPLATES_DIR") {
            self.server.templates_dir = PathBuf::from(dir);
        }

        if let Ok(path) = env::var("LV_DATA_PATH") {
            self.data.path = PathBuf::from(path);
        }

        if let Ok(path) = env::var("LV_DATA_FALLBACK") {
            self.data.fallback_path = PathBuf::from(path);
        }

        if let Ok(count) = env::var("LV_VIRTUALISE_FIRST") {
            self.transform.virtualise_first = count
                .parse()
                .map_err(|e| Error::config(format!("Invalid virtualise count: {}", e)))?;
        }

        if let Ok(capacity) = env::var("LV_DIAGNOSTICS_CAPACITY") {
            self.diagnostics.capacity = capacity
                .parse()
                .map_err(|e| Error::config(format!("Invalid diagnostics capacity: {}", e)))?;
        }

        if let Ok(level) = env::var("LV_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = env::var("LV_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.data.path.as_os_str().is_empty() {
            return Err(Error::config("Input table path must not be empty"));
        }

        if self.diagnostics.capacity == 0 {
            return Err(Error::config("Diagnostics capacity must be at least 1"));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(Error::config("Invalid log level")),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            _ => return Err(Error::config("Invalid log format")),
        }

        Ok(())
    }
}
