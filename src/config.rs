use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_ANONYMOUS_LABEL: &str = "Anonymous";

fn default_anonymous_label() -> String {
    DEFAULT_ANONYMOUS_LABEL.to_string()
}

/// Settings shared by every bundle built in one process.
///
/// The anonymization key feeds the keyed transform applied to a hidden
/// participant's name before it is hashed into a pseudonym. Pseudonyms are
/// only stable across builds that use the same key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EngineConfig {
    #[serde(default)]
    pub anonymization_key: String,
    #[serde(default = "default_anonymous_label")]
    pub anonymous_label: String,
}

impl EngineConfig {
    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            anonymization_key: key.into(),
            anonymous_label: default_anonymous_label(),
        }
    }

    /// Reads the key from `SECRET_KEY`. Tests fall back to a fixed key so
    /// that they do not depend on the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = if let Ok(secret) = std::env::var("SECRET_KEY") {
            secret
        } else if cfg!(test) {
            "0".repeat(64)
        } else {
            return Err(ConfigError::MissingKey);
        };

        Self::with_key(key).validated()
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validated()
    }

    /// Loads a TOML file. A `SECRET_KEY` in the environment takes precedence
    /// over the key in the file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: EngineConfig = toml::from_str(&contents)?;
        if let Ok(secret) = std::env::var("SECRET_KEY") {
            config.anonymization_key = secret;
        }

        tracing::debug!(path = %path.display(), "loaded engine config");

        config.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.anonymization_key.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        Ok(self)
    }
}
