//! Node configuration types.

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::DEFAULT_API_PORT;

/// Log levels accepted by `log_level`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log formats accepted by `log_format`.
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`NodeConfig`].
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A field holds an unsupported value.
    #[error("invalid {field}: {value:?}")]
    Invalid { field: &'static str, value: String },
}

/// Configuration for the Storefront node.
///
/// Every field has a default, so a configuration file only needs the
/// fields it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// API listen address.
    pub api_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (pretty, json).
    pub log_format: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_API_PORT)),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

impl NodeConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Checks field values that the type system does not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_level",
                value: self.log_level.clone(),
            });
        }
        if !LOG_FORMATS.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "log_format",
                value: self.log_format.clone(),
            });
        }
        Ok(())
    }
}
