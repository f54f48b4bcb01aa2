//! Configuration management for the `TripAgent` application
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, resolves the model credential once at startup, and validates
//! all settings. Nothing re-reads the environment after load.

use crate::TripAgentError;
use crate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the model service credential
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Root configuration structure for the `TripAgent` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TripAgentConfig {
    /// Model service configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Planner selection
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Model service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model service API key; absent means the mock planner is used
    pub api_key: Option<String>,
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the model service API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u32,
}

/// Which planner implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlannerMode {
    /// Live when an API key is configured, mock otherwise
    #[default]
    Auto,
    /// Fixed offline itinerary, no external calls
    Mock,
    /// Always call the model service; requires an API key
    Live,
}

/// Planner selection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    /// Planner mode (auto, mock, live)
    #[serde(default)]
    pub mode: PlannerMode,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Web server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the web form is served on
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_model_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_port() -> u16 {
    3000
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_model_base_url(),
            timeout_seconds: default_model_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
        }
    }
}

impl TripAgentConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPAGENT_PLANNER__MODE=mock
        builder = builder.add_source(
            Environment::with_prefix("TRIPAGENT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripAgentConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Credential resolution happens exactly once, here.
        if config.model.api_key.is_none() {
            config.model.api_key = std::env::var(API_KEY_ENV_VAR)
                .ok()
                .filter(|key| !key.is_empty());
        }

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripagent").join("config.toml"))
    }

    /// The planner mode that will actually run, with `Auto` resolved
    /// against the configured credential
    #[must_use]
    pub fn resolved_planner_mode(&self) -> PlannerMode {
        match self.planner.mode {
            PlannerMode::Auto => {
                if self.model.api_key.is_some() {
                    PlannerMode::Live
                } else {
                    PlannerMode::Mock
                }
            }
            mode => mode,
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_model_settings()?;
        self.validate_logging()?;
        Ok(())
    }

    /// Validate the API key and its consistency with the planner mode
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.model.api_key {
            if api_key.len() < 8 {
                return Err(TripAgentError::config(
                    "Model API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }

            if api_key.len() > 200 {
                return Err(TripAgentError::config(
                    "Model API key appears to be invalid (too long). Please check your API key.",
                )
                .into());
            }
        } else if self.planner.mode == PlannerMode::Live {
            return Err(TripAgentError::config(format!(
                "Planner mode is 'live' but no API key is configured. Set {API_KEY_ENV_VAR} or use mode 'mock'."
            ))
            .into());
        }

        Ok(())
    }

    /// Validate model service settings
    fn validate_model_settings(&self) -> Result<()> {
        if self.model.model.is_empty() {
            return Err(TripAgentError::config("Model identifier cannot be empty").into());
        }

        if self.model.timeout_seconds == 0 || self.model.timeout_seconds > 300 {
            return Err(TripAgentError::config(
                "Model request timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            return Err(
                TripAgentError::config("Model base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        Ok(())
    }

    /// Validate logging settings
    fn validate_logging(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripAgentError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripAgentError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
