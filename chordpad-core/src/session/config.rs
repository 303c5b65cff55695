//! Session settings, loadable from TOML
//!
//! ```toml
//! base_octave = 4
//! default_voicing = "smooth"
//! midi_velocity = 80
//! database_paths = ["extra_songs.json"]
//!
//! [key_range]
//! low = 36
//! high = 96
//! ```

use crate::types::note::KeyRange;
use crate::types::voicing::{VoicingGenerator, VoicingMode};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct SessionConfig {
    /// Octave of the root in root-position voicings (4 = middle C)
    pub base_octave: i8,
    pub key_range: KeyRange,
    pub default_voicing: VoicingMode,
    /// MIDI note-on velocity, 0-127
    pub midi_velocity: u8,
    /// MIDI channel, 0-15
    pub midi_channel: u8,
    /// How long a chord sounds on MIDI output
    pub chord_duration_ms: u64,
    /// Maximum number of action log entries kept
    pub log_capacity: usize,
    /// Extra JSON progression files merged over the built-in songs
    pub database_paths: Vec<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            base_octave: 4,
            key_range: KeyRange::piano(),
            default_voicing: VoicingMode::Root,
            midi_velocity: 64,
            midi_channel: 0,
            chord_duration_ms: 1000,
            log_capacity: 1000,
            database_paths: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Check ranges that the type system does not
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0..=8).contains(&self.base_octave) {
            return Err(ConfigError::Invalid(format!(
                "base_octave must be 0-8, got {}",
                self.base_octave
            )));
        }
        KeyRange::new(self.key_range.low, self.key_range.high)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.key_range.high > 127 {
            return Err(ConfigError::Invalid(format!(
                "key_range.high must be at most 127, got {}",
                self.key_range.high
            )));
        }
        if self.midi_velocity > 127 {
            return Err(ConfigError::Invalid(format!(
                "midi_velocity must be 0-127, got {}",
                self.midi_velocity
            )));
        }
        if self.midi_channel > 15 {
            return Err(ConfigError::Invalid(format!(
                "midi_channel must be 0-15, got {}",
                self.midi_channel
            )));
        }
        if self.log_capacity == 0 {
            return Err(ConfigError::Invalid("log_capacity must be positive".into()));
        }
        Ok(())
    }

    pub fn generator(&self) -> VoicingGenerator {
        VoicingGenerator::new(self.base_octave, self.key_range)
    }

    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and validate a TOML config file
    #[cfg(feature = "serde")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.midi_velocity, 64);
        assert_eq!(config.generator(), VoicingGenerator::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = SessionConfig {
            midi_velocity: 200,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = SessionConfig {
            key_range: KeyRange { low: 60, high: 64 },
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            default_voicing = "drop2"
            midi_velocity = 90

            [key_range]
            low = 36
            high = 96
            "#,
        )
        .unwrap();
        assert_eq!(config.default_voicing, VoicingMode::Drop2);
        assert_eq!(config.midi_velocity, 90);
        assert_eq!(config.key_range, KeyRange { low: 36, high: 96 });
        assert_eq!(config.base_octave, 4);
        assert!(config.validate().is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unknown_field_rejected() {
        assert!(SessionConfig::from_toml_str("tempo = 120").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chordpad.toml");
        std::fs::write(&path, "base_octave = 3\nmidi_channel = 9\n").unwrap();

        let config = SessionConfig::load(&path).unwrap();
        assert_eq!(config.base_octave, 3);
        assert_eq!(config.midi_channel, 9);

        std::fs::write(&path, "midi_channel = 16\n").unwrap();
        assert!(matches!(
            SessionConfig::load(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
