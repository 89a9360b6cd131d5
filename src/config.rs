//! Screen configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```rust
//! use stateful_screens::config::ScreensConfig;
//!
//! let config = ScreensConfig::from_toml_str("phone_digits = 10").unwrap();
//! assert_eq!(config.phone_digits, 10);
//! assert_eq!(config.sms_code_length, 5);
//! ```

use crate::core::DEFAULT_HISTORY_LIMIT;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScreensConfig {
    /// Digits in a complete phone number.
    pub phone_digits: usize,
    /// Digits in an SMS code; a complete code is submitted automatically.
    pub sms_code_length: usize,
    /// Button title of every error alert.
    pub retry_button_title: String,
    pub invalid_email_message: String,
    pub authorized_title: String,
    pub unauthorized_title: String,
    /// Transitions kept in each screen's state history.
    pub history_limit: usize,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            phone_digits: 11,
            sms_code_length: 5,
            retry_button_title: "Retry".to_string(),
            invalid_email_message: "Invalid e-mail entered".to_string(),
            authorized_title: "Registered user".to_string(),
            unauthorized_title: "Unregistered user".to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ScreensConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}
