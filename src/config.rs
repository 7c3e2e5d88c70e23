use crate::error::{Result, VoxplayError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stream: StreamSettings,
    pub playback: PlaybackSettings,
}

/// Streaming endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamSettings {
    /// URL of the chat streaming endpoint.
    pub endpoint: String,
}

/// Audio playback configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Initial ring buffer capacity in samples. Grows on demand.
    pub initial_buffer_samples: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8000/api/chat/stream".to_string(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            // One second of audio at the default rate
            initial_buffer_samples: 24_000,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|_| VoxplayError::ConfigFileNotFound {
            path: path.display().to_string(),
        })?;
        let config = Self::from_toml_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Check that all values are usable before starting a session.
    pub fn validate(&self) -> Result<()> {
        if self.playback.sample_rate == 0 {
            return Err(VoxplayError::ConfigInvalidValue {
                key: "playback.sample_rate".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.playback.initial_buffer_samples == 0 {
            return Err(VoxplayError::ConfigInvalidValue {
                key: "playback.initial_buffer_samples".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.stream.endpoint.is_empty() {
            return Err(VoxplayError::ConfigInvalidValue {
                key: "stream.endpoint".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.playback.sample_rate, 24_000);
        assert_eq!(config.playback.initial_buffer_samples, 24_000);
        assert!(config.stream.endpoint.contains("/api/chat/stream"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = Config::from_toml_str(
            r#"
            [playback]
            sample_rate = 48000
            "#,
        )
        .unwrap();
        assert_eq!(config.playback.sample_rate, 48_000);
        // Unspecified fields fall back to defaults
        assert_eq!(config.playback.initial_buffer_samples, 24_000);
        assert_eq!(config.stream, StreamSettings::default());
    }

    #[test]
    fn test_from_toml_str_full() {
        let config = Config::from_toml_str(
            r#"
            [stream]
            endpoint = "https://chat.example.com/stream"

            [playback]
            sample_rate = 16000
            initial_buffer_samples = 8000
            "#,
        )
        .unwrap();
        assert_eq!(config.stream.endpoint, "https://chat.example.com/stream");
        assert_eq!(config.playback.sample_rate, 16_000);
        assert_eq!(config.playback.initial_buffer_samples, 8_000);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = Config::from_toml_str("not = valid = toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_sample_rate() {
        let mut config = Config::default();
        config.playback.sample_rate = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("playback.sample_rate"));
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut config = Config::default();
        config.stream.endpoint = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/voxplay.toml"));
        assert!(matches!(
            result,
            Err(VoxplayError::ConfigFileNotFound { .. })
        ));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default(Path::new("/nonexistent/voxplay.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playback]\nsample_rate = 44100").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.playback.sample_rate, 44_100);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[playback\nbroken").unwrap();
        assert!(Config::load(file.path()).is_err());
    }
}
