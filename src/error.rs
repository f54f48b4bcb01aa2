//! Error types and handling for the `TripAgent` application

use thiserror::Error;

/// Main error type for the `TripAgent` application
#[derive(Error, Debug)]
pub enum TripAgentError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Model service communication errors
    #[error("Model API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Structured-response decode errors
    #[error("Failed to decode model response: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TripAgentError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new model API error
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

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripAgentError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            TripAgentError::Api { .. } => {
                "Unable to reach the model service. Please check your internet connection and API key."
                    .to_string()
            }
            TripAgentError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripAgentError::Decode { .. } => {
                "The model returned an itinerary in an unexpected format. Please try again."
                    .to_string()
            }
            TripAgentError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TripAgentError::General { message } => message.clone(),
        }
    }
}
