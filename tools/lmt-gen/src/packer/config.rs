// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Packer configuration.
//!
//! The defaults describe the standard firmware layout. A TOML file can
//! extend the required field list:
//!
//! ```toml
//! required_fields = ["SERVER_HOSTNAME", "SERVER_PORT", "COAP_TX_RESOURCE",
//!                    "COAP_TX_FILE_RESOURCE", "COAP_TX_FW_RESOURCE", "APN"]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable that downgrades the "no configuration" condition.
pub const DOCKER_ENV_FLAG: &str = "ZEPHYR_IN_DOCKER";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Packer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Mandatory file, validated against `required_fields`.
    #[serde(default = "default_mandatory_file")]
    pub mandatory_file: String,

    /// Optional files, packed after the mandatory one in this order.
    #[serde(default = "default_optional_files")]
    pub optional_files: Vec<String>,

    /// Fields that must be present in the mandatory file.
    #[serde(default = "default_required_fields")]
    pub required_fields: Vec<String>,

    /// Required field validated as a port number instead of a string.
    #[serde(default = "default_port_field")]
    pub port_field: String,
}

fn default_mandatory_file() -> String {
    "COAP.json".to_string()
}

fn default_optional_files() -> Vec<String> {
    vec!["Settings.json".to_string(), "Application.json".to_string()]
}

fn default_required_fields() -> Vec<String> {
    [
        "SERVER_HOSTNAME",
        "SERVER_PORT",
        "COAP_TX_RESOURCE",
        "COAP_TX_FILE_RESOURCE",
        "COAP_TX_FW_RESOURCE",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_port_field() -> String {
    "SERVER_PORT".to_string()
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            mandatory_file: default_mandatory_file(),
            optional_files: default_optional_files(),
            required_fields: default_required_fields(),
            port_field: default_port_field(),
        }
    }
}

impl PackerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mandatory_file.is_empty() {
            return Err(ConfigError::Invalid("Empty mandatory file name".into()));
        }
        if self.optional_files.iter().any(|f| f == &self.mandatory_file) {
            return Err(ConfigError::Invalid(format!(
                "{} listed as both mandatory and optional",
                self.mandatory_file
            )));
        }
        if self.required_fields.iter().any(String::is_empty) {
            return Err(ConfigError::Invalid("Empty required field name".into()));
        }
        Ok(())
    }

    /// All file names in processing order.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.mandatory_file.as_str())
            .chain(self.optional_files.iter().map(String::as_str))
    }
}

/// Whether an empty blob should fail the run, given the value of
/// [`DOCKER_ENV_FLAG`].
#[must_use]
pub fn empty_blob_is_fatal(flag: Option<&str>) -> bool {
    flag != Some("1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackerConfig::default();
        let files: Vec<_> = config.files().collect();
        assert_eq!(files, vec!["COAP.json", "Settings.json", "Application.json"]);
        assert_eq!(config.required_fields.len(), 5);
        assert_eq!(config.port_field, "SERVER_PORT");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PackerConfig = toml::from_str(r#"required_fields = ["A", "B"]"#).unwrap();
        assert_eq!(config.required_fields, vec!["A", "B"]);
        assert_eq!(config.mandatory_file, "COAP.json");
        assert_eq!(config.optional_files.len(), 2);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("packer.toml");
        std::fs::write(&path, "optional_files = [\"Extra.json\"]\n").unwrap();

        let config = PackerConfig::from_file(&path).unwrap();
        assert_eq!(config.optional_files, vec!["Extra.json"]);
    }

    #[test]
    fn test_mandatory_listed_as_optional_rejected() {
        let config = PackerConfig {
            optional_files: vec!["COAP.json".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_empty_blob_flag() {
        assert!(empty_blob_is_fatal(None));
        assert!(empty_blob_is_fatal(Some("0")));
        assert!(empty_blob_is_fatal(Some("true")));
        assert!(!empty_blob_is_fatal(Some("1")));
    }
}
