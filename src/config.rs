//! Configuration management for the trip planner service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use crate::planner::ResponseCheck;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "AIR_PLANNER";

/// Credential variable honoured when no key is configured explicitly
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Root configuration structure for the trip planner service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Generative model API configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Prompt and response handling
    #[serde(default)]
    pub planner: PlanningConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body in KiB
    #[serde(default = "default_max_body_kb")]
    pub max_body_kb: u32,
    /// Serve HTTPS with these certificates
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

/// PEM certificate and key locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Gemini API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the generative language API
    pub api_key: Option<String>,
    /// Base URL for the generative language API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_gemini_timeout")]
    pub timeout_seconds: u32,
    /// Model identifiers, most preferred first
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

/// Prompt and response handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Currency used for every cost estimate
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Acceptance rule for model responses
    #[serde(default)]
    pub response_check: ResponseCheck,
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
    /// OTLP/HTTP collector endpoint for span export
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_kb() -> u32 {
    64
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> u32 {
    60
}

fn default_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash-exp".to_string(),
        "gemini-2.0-flash".to_string(),
    ]
}

fn default_currency() -> String {
    "KRW".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_kb: default_max_body_kb(),
            tls: None,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_gemini_base_url(),
            timeout_seconds: default_gemini_timeout(),
            models: default_models(),
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            response_check: ResponseCheck::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl PlannerConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AIR_PLANNER_GEMINI__MODELS=a,b style overrides
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("gemini.models")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.gemini.api_key.is_none() {
            config.gemini.api_key = std::env::var(GOOGLE_API_KEY_VAR).ok();
        }

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("air-planner").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.max_body_kb == 0 {
            self.server.max_body_kb = default_max_body_kb();
        }
        if self.gemini.base_url.is_empty() {
            self.gemini.base_url = default_gemini_base_url();
        }
        if self.gemini.timeout_seconds == 0 {
            self.gemini.timeout_seconds = default_gemini_timeout();
        }
        if self.gemini.models.is_empty() {
            self.gemini.models = default_models();
        }
        if self.planner.currency.is_empty() {
            self.planner.currency = default_currency();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_models()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let Some(api_key) = &self.gemini.api_key else {
            return Err(PlannerError::config(format!(
                "Gemini API key is required. Set {ENV_PREFIX}_GEMINI__API_KEY or {GOOGLE_API_KEY_VAR}."
            ))
            .into());
        };

        if api_key.trim().is_empty() {
            return Err(PlannerError::config(
                "Gemini API key cannot be empty. Please provide a valid key.",
            )
            .into());
        }

        if api_key.len() < 8 {
            return Err(PlannerError::config(
                "Gemini API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 200 {
            return Err(PlannerError::config(
                "Gemini API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate the model candidate list
    fn validate_models(&self) -> Result<()> {
        if self.gemini.models.is_empty() {
            return Err(PlannerError::config("At least one Gemini model must be configured").into());
        }

        if self.gemini.models.iter().any(|model| model.trim().is_empty()) {
            return Err(PlannerError::config("Gemini model identifiers cannot be blank").into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.gemini.timeout_seconds > 300 {
            return Err(
                PlannerError::config("Gemini API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.server.max_body_kb > 10240 {
            return Err(PlannerError::config(
                "Maximum request body cannot exceed 10240 KiB (10 MiB)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.gemini.base_url) {
            return Err(PlannerError::config(
                "Gemini API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(PlannerError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        if self.planner.currency.trim().is_empty() {
            return Err(PlannerError::config("Currency cannot be blank").into());
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        if self.server.tls.is_some() && !cfg!(feature = "tls") {
            return Err(PlannerError::config(
                "TLS is configured but this binary was built without the `tls` feature",
            )
            .into());
        }
        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
