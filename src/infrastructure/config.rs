//! Configuration infrastructure
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults (every section is `#[serde(default)]`)
//! 2. Optional config file (`<config dir>/namshi-product-bot/config.*`, or an explicit path)
//! 3. `NAMSHI_BOT__SECTION__KEY` environment variables
//!
//! The bot token is a secret and only ever comes from `TELEGRAM_BOT_TOKEN`.

#![allow(clippy::uninlined_format_args)]

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::parsing::ParsingConfig;
use super::simple_http_client::HttpClientConfig;
use super::telegram::TelegramConfig;
use crate::domain::constants::delivery::MEDIA_GROUP_LIMIT;

/// Application directory name under the user config directory
pub const APP_DIR_NAME: &str = "namshi-product-bot";

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "NAMSHI_BOT";

/// Environment variable holding the bot token
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {source}")]
    Load {
        #[from]
        source: ::config::ConfigError,
    },

    #[error("TELEGRAM_BOT_TOKEN is not set")]
    MissingToken,

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub http: HttpClientConfig,
    pub parsing: ParsingConfig,
    pub delivery: DeliveryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Photos per grouped message (1..=10)
    pub media_group_limit: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            media_group_limit: MEDIA_GROUP_LIMIT,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console output
    pub console_output: bool,

    /// Enable daily rolling file output
    pub file_output: bool,

    /// Log directory; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Default config file location (extension picked by the `config` crate)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config"))
    }

    /// Where `load(path)` reads its file from, for the startup log
    pub fn source_description(path: Option<&Path>) -> String {
        match path {
            Some(path) => format!("config file {}", path.display()),
            None => match Self::default_config_path() {
                Some(default_path) => format!("optional config file {}.*", default_path.display()),
                None => "built-in defaults".to_string(),
            },
        }
    }

    /// Load defaults, then the config file, then environment overrides.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(::config::File::from(path));
            }
            None => {
                if let Some(default_path) = Self::default_config_path() {
                    builder = builder.add_source(
                        ::config::File::with_name(&default_path.to_string_lossy()).required(false),
                    );
                }
            }
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MEDIA_GROUP_LIMIT).contains(&self.delivery.media_group_limit) {
            return Err(ConfigError::Validation {
                message: format!(
                    "delivery.media_group_limit must be between 1 and {}, got {}",
                    MEDIA_GROUP_LIMIT, self.delivery.media_group_limit
                ),
            });
        }

        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "http.user_agent cannot be empty".to_string(),
            });
        }

        if self.http.timeout_seconds == Some(0) {
            return Err(ConfigError::Validation {
                message: "http.timeout_seconds must be positive".to_string(),
            });
        }

        if self.telegram.api_base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "telegram.api_base_url cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Read the bot token from the environment
pub fn bot_token_from_env() -> Result<String, ConfigError> {
    resolve_bot_token(std::env::var(TOKEN_ENV_VAR).ok())
}

/// Validate a raw token value; blank counts as missing
pub fn resolve_bot_token(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or(ConfigError::MissingToken)
}
