//! Error types and handling for the trip planner service

use thiserror::Error;

/// Main error type for the trip planner service
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Model API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl PlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            PlannerError::Api { .. } => {
                "Unable to reach the model API. Please check your network connection.".to_string()
            }
            PlannerError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = PlannerError::config("missing API key");
        assert!(matches!(config_err, PlannerError::Config { .. }));

        let api_err = PlannerError::api("connection failed");
        assert!(matches!(api_err, PlannerError::Api { .. }));

        let validation_err = PlannerError::validation("destination is required");
        assert!(matches!(validation_err, PlannerError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = PlannerError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = PlannerError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));

        let validation_err = PlannerError::validation("transport is empty");
        assert!(validation_err.user_message().contains("transport is empty"));
    }
}
