//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ForgeError, ForgeResult};

/// Configuration for a forge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    /// Maximum expressions kept per power.
    pub max_expressions_per_power: usize,

    /// Maximum acquisition profiles kept per power.
    pub max_profiles_per_power: usize,

    /// Locale of the generated display text.
    pub locale: String,

    /// Version stamped on generated display text.
    pub text_version: u32,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            max_expressions_per_power: 3,
            max_profiles_per_power: 3,
            locale: "en-GB".to_string(),
            text_version: 1,
        }
    }
}

impl ForgeConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> ForgeResult<Self> {
        let config: ForgeConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ForgeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject values that would break the coverage guarantees.
    pub fn validate(&self) -> ForgeResult<()> {
        if self.max_expressions_per_power == 0 {
            return Err(ForgeError::InvalidConfig(
                "max_expressions_per_power must be at least 1".to_string(),
            ));
        }
        if self.max_profiles_per_power == 0 {
            return Err(ForgeError::InvalidConfig(
                "max_profiles_per_power must be at least 1".to_string(),
            ));
        }
        if self.locale.trim().is_empty() {
            return Err(ForgeError::InvalidConfig("locale must not be empty".to_string()));
        }
        Ok(())
    }
}
