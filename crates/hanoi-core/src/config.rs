//! Configuration loading and typed config structures.
//!
//! The configuration lives in `hanoi-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure, and provides a
//! loader that reads and validates the file. Every field has a default,
//! so an empty document is a valid configuration.

use std::path::Path;
use std::time::Duration;

use hanoi_board::MAX_DISK_COUNT;
use hanoi_types::Peg;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range or inconsistent with another value.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HanoiConfig {
    /// Puzzle size and peg roles.
    #[serde(default)]
    pub puzzle: PuzzleConfig,

    /// Playback tempo and event buffering.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HanoiConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidConfiguration`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidConfiguration`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] describing the first
    /// problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.puzzle.validate()?;
        self.playback.validate()
    }
}

/// Puzzle size and peg roles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PuzzleConfig {
    /// Number of disks to solve for.
    #[serde(default = "default_disk_count")]
    pub disk_count: u32,

    /// Upper bound accepted for `disk_count`.
    #[serde(default = "default_max_disks")]
    pub max_disks: u32,

    /// Peg the disks start on.
    #[serde(default = "default_source")]
    pub source: Peg,

    /// Peg the disks must end on.
    #[serde(default = "default_destination")]
    pub destination: Peg,

    /// Free peg used for intermediate moves.
    #[serde(default = "default_auxiliary")]
    pub auxiliary: Peg,
}

impl PuzzleConfig {
    /// Check the disk count bounds and peg roles.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if `disk_count` is 0
    /// or above `max_disks`, if `max_disks` exceeds the board's hard cap,
    /// or if the pegs are not pairwise distinct.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_disks > MAX_DISK_COUNT {
            return Err(ConfigError::InvalidConfiguration {
                reason: format!(
                    "max_disks {} exceeds hard limit {MAX_DISK_COUNT}",
                    self.max_disks
                ),
            });
        }
        if self.disk_count == 0 || self.disk_count > self.max_disks {
            return Err(ConfigError::InvalidConfiguration {
                reason: format!(
                    "disk_count must be between 1 and {}, got {}",
                    self.max_disks, self.disk_count
                ),
            });
        }
        if !Peg::all_distinct(self.source, self.destination, self.auxiliary) {
            return Err(ConfigError::InvalidConfiguration {
                reason: format!(
                    "source, destination, and auxiliary must differ, got {}, {}, {}",
                    self.source, self.destination, self.auxiliary
                ),
            });
        }
        Ok(())
    }
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            disk_count: default_disk_count(),
            max_disks: default_max_disks(),
            source: default_source(),
            destination: default_destination(),
            auxiliary: default_auxiliary(),
        }
    }
}

/// Playback tempo and event buffering.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Real-time milliseconds to wait after each move (0 = as fast as the
    /// scheduler permits).
    #[serde(default = "default_step_duration_ms")]
    pub step_duration_ms: u64,

    /// Events buffered per subscriber. When a buffer is full the player
    /// waits for that subscriber to catch up; no event is dropped.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl PlaybackConfig {
    /// The per-move wait as a [`Duration`].
    pub const fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }

    /// Check the event capacity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfiguration`] if `event_capacity`
    /// is 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::InvalidConfiguration {
                reason: "event_capacity must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            step_duration_ms: default_step_duration_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_disk_count() -> u32 {
    3
}

const fn default_max_disks() -> u32 {
    20
}

const fn default_source() -> Peg {
    Peg::A
}

const fn default_destination() -> Peg {
    Peg::B
}

const fn default_auxiliary() -> Peg {
    Peg::C
}

const fn default_step_duration_ms() -> u64 {
    500
}

const fn default_event_capacity() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = HanoiConfig::default();
        assert_eq!(config.puzzle.disk_count, 3);
        assert_eq!(config.puzzle.source, Peg::A);
        assert_eq!(config.puzzle.destination, Peg::B);
        assert_eq!(config.playback.step_duration_ms, 500);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = HanoiConfig::parse("{}").unwrap();
        assert_eq!(config, HanoiConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
puzzle:
  disk_count: 6
  max_disks: 10
  source: c
  destination: A
  auxiliary: B

playback:
  step_duration_ms: 0
  event_capacity: 64

logging:
  level: debug
  format: json
";
        let config = HanoiConfig::parse(yaml).unwrap();
        assert_eq!(config.puzzle.disk_count, 6);
        assert_eq!(config.puzzle.max_disks, 10);
        assert_eq!(config.puzzle.source, Peg::C);
        assert_eq!(config.puzzle.destination, Peg::A);
        assert_eq!(config.puzzle.auxiliary, Peg::B);
        assert_eq!(config.playback.step_duration(), Duration::ZERO);
        assert_eq!(config.playback.event_capacity, 64);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn rejects_zero_disks() {
        let result = HanoiConfig::parse("puzzle:\n  disk_count: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_disk_count_above_max() {
        let result = HanoiConfig::parse("puzzle:\n  disk_count: 12\n  max_disks: 10\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_max_above_hard_limit() {
        let yaml = format!("puzzle:\n  max_disks: {}\n", MAX_DISK_COUNT + 1);
        assert!(matches!(
            HanoiConfig::parse(&yaml),
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_shared_pegs() {
        let result = HanoiConfig::parse("puzzle:\n  destination: A\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn rejects_zero_event_capacity() {
        let result = HanoiConfig::parse("playback:\n  event_capacity: 0\n");
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = HanoiConfig::parse("puzzle: [unterminated");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = HanoiConfig::from_file(Path::new("/nonexistent/hanoi-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
