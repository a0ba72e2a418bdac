//! Configuration management for chanrec
//!
//! Provides loading, saving and validation of the recorder's TOML settings:
//! where files go, how the device is read, and how long to record.

use crate::errors::RecorderError;
use crate::recording::{ChannelLabels, TimeUnit, DEFAULT_BLOCK_SIZE, DEFAULT_SUFFIX};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub storage: StorageConfig,
    pub capture: CaptureSettings,
    pub schedule: ScheduleConfig,
}

/// Output locations and naming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Main output directory, relative to the working directory unless absolute
    pub main_dir: String,
    /// Backup output directory, relative to the working directory unless absolute
    pub backup_dir: String,
    /// Text between the channel label and the timestamp in file names
    pub suffix: String,
}

/// Device read parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Number of interleaved channels to capture
    pub channels: usize,
    /// Frames per channel pulled per read
    pub block_size: usize,
}

/// Total budget and segmenting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Total recording time, in `recording_unit`
    pub recording_time: u64,
    pub recording_unit: TimeUnit,
    /// Length of each segment in seconds
    pub recording_length: u64,
    /// Comma-separated channel labels
    pub channel_names: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            main_dir: "data".to_string(),
            backup_dir: "backup".to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            channels: 2,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            recording_time: 1,
            recording_unit: TimeUnit::Minutes,
            recording_length: 60,
            channel_names: "channel_1,channel_2".to_string(),
        }
    }
}

impl RecorderConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecorderError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| RecorderError::Config(format!("Failed to read config file: {}", e)))?;

        let config: RecorderConfig = toml::from_str(&contents)
            .map_err(|e| RecorderError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RecorderError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                RecorderError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| RecorderError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| RecorderError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("chanrec.toml")
    }

    /// Parsed channel labels
    pub fn channel_labels(&self) -> Result<ChannelLabels, RecorderError> {
        ChannelLabels::parse(&self.schedule.channel_names)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), RecorderError> {
        if self.capture.channels == 0 {
            return Err(RecorderError::InvalidChannelCount(0));
        }
        if self.capture.block_size == 0 {
            return Err(RecorderError::Config("Block size must be at least 1".to_string()));
        }
        if self.schedule.recording_length == 0 {
            return Err(RecorderError::InvalidSchedule(
                "Segment length must be at least one second".to_string(),
            ));
        }
        if self.storage.main_dir.trim().is_empty() || self.storage.backup_dir.trim().is_empty() {
            return Err(RecorderError::Config("Output directories must not be empty".to_string()));
        }
        self.channel_labels()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RecorderConfig::default();
        assert_eq!(config.storage.main_dir, "data");
        assert_eq!(config.storage.backup_dir, "backup");
        assert_eq!(config.storage.suffix, "_channel_");
        assert_eq!(config.capture.channels, 2);
        assert_eq!(config.capture.block_size, 1024);
        assert_eq!(config.schedule.recording_time, 1);
        assert_eq!(config.schedule.recording_unit, TimeUnit::Minutes);
        assert_eq!(config.schedule.recording_length, 60);
        assert_eq!(config.channel_labels().unwrap().len(), 2);
        assert_eq!(RecorderConfig::default_path(), PathBuf::from("chanrec.toml"));
    }

    #[test]
    fn test_config_validation() {
        let config = RecorderConfig::default();
        assert!(config.validate().is_ok());

        let mut bad = config.clone();
        bad.capture.channels = 0;
        assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::InvalidChannelCount);

        let mut bad = config.clone();
        bad.schedule.recording_length = 0;
        assert_eq!(bad.validate().unwrap_err().kind(), ErrorKind::InvalidSchedule);

        let mut bad = config.clone();
        bad.schedule.channel_names = "a,,b".to_string();
        assert!(bad.validate().is_err());

        let mut bad = config;
        bad.capture.block_size = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempdir().expect("tempdir");
        let config_path = dir.path().join("nested").join("chanrec.toml");

        let mut config = RecorderConfig::default();
        config.schedule.recording_unit = TimeUnit::Hours;
        config.capture.channels = 4;
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = RecorderConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_toml_format() {
        let config = RecorderConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("[capture]"));
        assert!(toml_string.contains("[schedule]"));
        assert!(toml_string.contains("recording_unit = \"minutes\""));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[capture]\nchannels = 8\n").unwrap();

        let loaded = RecorderConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.capture.channels, 8);
        assert_eq!(loaded.capture.block_size, 1024);
        assert_eq!(loaded.storage.main_dir, "data");
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = RecorderConfig::load_from_file("nonexistent_chanrec.toml");
        assert!(result.is_ok());
        assert_eq!(result.unwrap().schedule.recording_length, 60);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[capture\nchannels = ").unwrap();
        let err = RecorderConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
