//! Error types for mozzie.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MozzieError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Input errors
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Audio decoding failed: {message}")]
    Decode { message: String },

    // Session errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("A {mode} classification request is already in flight")]
    SessionBusy { mode: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl MozzieError {
    /// Shorthand for an `InvalidInput` error with a formatted message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        MozzieError::InvalidInput {
            message: message.into(),
        }
    }

    /// Shorthand for a `Protocol` error with a formatted message.
    pub fn protocol(message: impl Into<String>) -> Self {
        MozzieError::Protocol {
            message: message.into(),
        }
    }

    /// Shorthand for a `Transport` error with a formatted message.
    pub fn transport(message: impl Into<String>) -> Self {
        MozzieError::Transport {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MozzieError>;
