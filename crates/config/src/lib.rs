//! Configuration loading and validation for the ADF toolchain.
//!
//! Loads `adf.toml` from the working directory (or the file named by
//! `ADF_CONFIG`) with environment variable overrides. Every field has a
//! default, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "adf.toml";

/// The root configuration structure. Maps directly to `adf.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfConfig {
    /// Directory holding the manifest and module documents
    #[serde(default = "default_ai_dir")]
    pub ai_dir: PathBuf,

    /// Manifest file name, relative to `ai_dir`
    #[serde(default = "default_manifest")]
    pub manifest: String,

    #[serde(default)]
    pub bundle: BundleConfig,

    #[serde(default)]
    pub evidence: EvidenceConfig,
}

fn default_ai_dir() -> PathBuf {
    PathBuf::from(".ai")
}
fn default_manifest() -> String {
    "manifest.adf".into()
}
fn default_min_keyword_len() -> usize {
    2
}

/// Task keyword extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Shorter tokens are dropped from the task keyword set
    #[serde(default = "default_min_keyword_len")]
    pub min_keyword_len: usize,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            min_keyword_len: default_min_keyword_len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Treat a metric sitting exactly at its ceiling as a failure
    #[serde(default)]
    pub fail_on_warn: bool,
}

impl AdfConfig {
    /// Load from `$ADF_CONFIG` or `./adf.toml`, then apply environment
    /// overrides:
    /// - `ADF_AI_DIR`
    /// - `ADF_MANIFEST`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ADF_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE));
        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("ADF_AI_DIR").filter(|v| !v.is_empty()) {
            self.ai_dir = PathBuf::from(dir);
        }
        if let Some(manifest) = lookup("ADF_MANIFEST").filter(|v| !v.is_empty()) {
            self.manifest = manifest;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.ai_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError("ai_dir must not be empty".into()));
        }
        if self.manifest.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "manifest must not be empty".into(),
            ));
        }
        if self.bundle.min_keyword_len == 0 {
            return Err(ConfigError::ValidationError(
                "bundle.min_keyword_len must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the manifest document.
    pub fn manifest_path(&self) -> PathBuf {
        self.ai_dir.join(&self.manifest)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self {
            ai_dir: default_ai_dir(),
            manifest: default_manifest(),
            bundle: BundleConfig::default(),
            evidence: EvidenceConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
