//! Classifier configuration.

use std::env;

use serde::Deserialize;

use crate::error::ConfigError;

/// Environment variable read by [`ClassifierConfig::from_env`].
pub const FALLBACK_TO_ERROR_VAR: &str = "OUTCOME_FALLBACK_TO_ERROR";

/// Policy for classifying responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// When a 2xx body does not decode as the success shape, try the error
    /// shape before settling for an empty success.
    pub fallback_to_error_on_unparsed_success: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fallback_to_error_on_unparsed_success: true,
        }
    }
}

impl ClassifierConfig {
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_error_on_unparsed_success = enabled;
        self
    }

    /// Read the config from the environment. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(value) = env::var(FALLBACK_TO_ERROR_VAR) {
            config.fallback_to_error_on_unparsed_success = parse_flag(FALLBACK_TO_ERROR_VAR, &value)?;
        }
        Ok(config)
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
        }),
    }
}
