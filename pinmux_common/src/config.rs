//! Configuration loading traits and types.
//!
//! This module provides the tool configuration (`pinmux.toml`) and the
//! [`ConfigLoader`] trait used to read any TOML-backed configuration struct.
//!
//! # Usage
//!
//! ```rust,no_run
//! use pinmux_common::config::{ConfigLoader, ConfigError, PinMuxConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = PinMuxConfig::load(Path::new("pinmux.toml"))?;
//!     config.validate()?;
//!     println!("Reports go to {}", config.export.output_dir.display());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn default_service_name() -> String {
    "pinmux".to_string()
}

/// Common fields shared by every PinMux front end.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "pinmux-bench"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Instance identifier, shows up in log output.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_delimiter() -> char {
    crate::export::DEFAULT_DELIMITER
}

/// Report export settings (`[export]` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the report file is written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Field delimiter. Must be a single character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            delimiter: default_delimiter(),
        }
    }
}

impl ExportConfig {
    /// Validate the export settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the delimiter is a double
    /// quote or a line break, both of which would corrupt the row layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(ConfigError::ValidationError(format!(
                "delimiter {:?} is not allowed",
                self.delimiter
            )));
        }
        Ok(())
    }
}

/// Top-level `pinmux.toml`.
///
/// Every table is optional, a missing file is equivalent to
/// `PinMuxConfig::default()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinMuxConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl PinMuxConfig {
    /// Validate all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.export.validate()
    }

    /// Load `path` if it exists, fall back to defaults otherwise.
    ///
    /// Parse and validation errors are still reported.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound) => Self::default(),
            Err(e) => return Err(e),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
