//! Configuration management infrastructure.
//!
//! This module provides configuration file support, allowing users to save
//! and load encryption preferences such as the default output encoding and
//! how strictly recipient certificates are checked.

use crate::domain::constants::DEFAULT_EXPIRY_WARNING_DAYS;
use crate::domain::envelope::OutputEncoding;
use crate::infra::error::{CmsError, CmsResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration with all encryption preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptorConfiguration {
    /// Default output encoding (`pem` or `der`)
    pub output_format: String,

    /// Warn when the recipient certificate expires within this many days
    pub expiry_warning_days: u32,

    /// Fail instead of warning when the recipient certificate is outside its validity period
    pub reject_expired_recipient: bool,

    /// Whether to show verbose output
    pub verbose: bool,
}

impl Default for EncryptorConfiguration {
    fn default() -> Self {
        Self {
            output_format: OutputEncoding::Pem.as_str().to_string(),
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            reject_expired_recipient: false,
            verbose: false,
        }
    }
}

impl EncryptorConfiguration {
    /// Parsed output encoding.
    pub fn output_encoding(&self) -> CmsResult<OutputEncoding> {
        self.output_format.parse::<OutputEncoding>().map_err(|_| {
            CmsError::ConfigurationError(format!(
                "Invalid output format: {}",
                self.output_format
            ))
        })
    }
}

/// Configuration manager for handling config files
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager with default path
    pub fn new() -> CmsResult<Self> {
        let config_path = Self::default_config_path()?;
        Ok(Self { config_path })
    }

    /// Create a configuration manager with custom path
    pub fn with_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CmsResult<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Ok(config_dir.join("cms-encrypt").join("config.toml"))
        } else {
            Ok(PathBuf::from("cms-encrypt-config.toml"))
        }
    }

    /// Load configuration from file, falling back to defaults when it doesn't exist.
    ///
    /// Nothing is written to disk on the fallback path.
    pub fn load_or_default(&self) -> CmsResult<EncryptorConfiguration> {
        if self.config_path.exists() {
            self.load()
        } else {
            log::debug!(
                "Configuration file not found, using defaults: {}",
                self.config_path.display()
            );
            Ok(EncryptorConfiguration::default())
        }
    }

    /// Load configuration from file
    pub fn load(&self) -> CmsResult<EncryptorConfiguration> {
        log::debug!("Loading configuration from: {}", self.config_path.display());

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            CmsError::ConfigurationError(format!(
                "Failed to read config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: EncryptorConfiguration = toml::from_str(&content).map_err(|e| {
            CmsError::ConfigurationError(format!("Failed to parse config file: {e}"))
        })?;

        self.validate_config(&config)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &EncryptorConfiguration) -> CmsResult<()> {
        self.validate_config(config)?;
        log::info!("Saving configuration to: {}", self.config_path.display());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CmsError::ConfigurationError(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| {
            CmsError::ConfigurationError(format!("Failed to serialize config: {e}"))
        })?;

        fs::write(&self.config_path, content).map_err(|e| {
            CmsError::ConfigurationError(format!(
                "Failed to write config file {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Validate configuration values
    fn validate_config(&self, config: &EncryptorConfiguration) -> CmsResult<()> {
        config.output_encoding()?;

        if config.expiry_warning_days > 3650 {
            return Err(CmsError::ConfigurationError(format!(
                "Expiry warning window too large: {} days",
                config.expiry_warning_days
            )));
        }

        Ok(())
    }

    /// Get the configuration file path
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }
}
