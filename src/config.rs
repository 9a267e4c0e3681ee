//! Registry configuration
//!
//! Settings can be built in code or read from a TOML file:
//!
//! ```toml
//! data_dir = "/srv/registry"
//! collection = "data/animals"
//! id_strategy = "sequential"
//! max_id_attempts = 8
//!
//! [jwt]
//! secret = "change-me"
//! audience = "animal-registry"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::auth::{JwtAuthVerifier, JwtConfig};
use crate::ingest::{DEFAULT_MAX_ID_ATTEMPTS, IdStrategy};
use crate::model::DEFAULT_COLLECTION;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for a registry instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Root directory of the file system backend
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Collection path inside the backend
    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default)]
    pub id_strategy: IdStrategy,

    /// Candidate ids tried per creation before giving up
    #[serde(default = "default_max_id_attempts")]
    pub max_id_attempts: usize,

    /// Token verification settings
    #[serde(default)]
    pub jwt: Option<JwtConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_max_id_attempts() -> usize {
    DEFAULT_MAX_ID_ATTEMPTS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            collection: default_collection(),
            id_strategy: IdStrategy::default(),
            max_id_attempts: default_max_id_attempts(),
            jwt: None,
        }
    }
}

impl RegistryConfig {
    /// Parse and validate TOML configuration text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check settings that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let collection = self.collection.trim_matches('/');
        if collection.is_empty() {
            return Err(ConfigError::Invalid("collection cannot be empty".to_string()));
        }
        if collection.split('/').any(|segment| segment == "..") {
            return Err(ConfigError::Invalid(format!(
                "collection `{}` must stay inside the data directory",
                self.collection
            )));
        }
        if self.max_id_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_id_attempts must be at least 1".to_string(),
            ));
        }
        if let Some(jwt) = &self.jwt
            && jwt.secret.is_empty()
        {
            return Err(ConfigError::Invalid("jwt.secret cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Build the token verifier described by the `[jwt]` section
    pub fn jwt_verifier(&self) -> Result<JwtAuthVerifier, ConfigError> {
        self.jwt
            .clone()
            .map(JwtAuthVerifier::new)
            .ok_or_else(|| ConfigError::Invalid("missing [jwt] section".to_string()))
    }
}
