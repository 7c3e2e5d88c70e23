//! Error types for voxplay.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxplayError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio payload errors
    #[error("Audio decode failed: {message}")]
    Decode { message: String },

    #[error("Audio input failed: {message}")]
    AudioInput { message: String },

    // Playback errors
    #[error("Audio output failed: {message}")]
    AudioOutput { message: String },

    #[error("Playback engine is not running")]
    PlayerStopped,

    // Streaming errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Stream returned status {status}")]
    StreamStatus { status: u16 },

    #[error("Stream error: {message}")]
    Stream { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, VoxplayError>;
