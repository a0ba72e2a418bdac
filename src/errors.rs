use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`RecorderError`], reported to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NoDeviceFound,
    InvalidDeviceSelection,
    DeviceValidationFailed,
    InvalidChannelCount,
    DeviceUnavailable,
    ShortRead,
    FilesystemWriteFailure,
    InvalidSchedule,
    Config,
    Backend,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoDeviceFound => "NoDeviceFound",
            ErrorKind::InvalidDeviceSelection => "InvalidDeviceSelection",
            ErrorKind::DeviceValidationFailed => "DeviceValidationFailed",
            ErrorKind::InvalidChannelCount => "InvalidChannelCount",
            ErrorKind::DeviceUnavailable => "DeviceUnavailable",
            ErrorKind::ShortRead => "ShortRead",
            ErrorKind::FilesystemWriteFailure => "FilesystemWriteFailure",
            ErrorKind::InvalidSchedule => "InvalidSchedule",
            ErrorKind::Config => "Config",
            ErrorKind::Backend => "Backend",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("No device found")]
    NoDeviceFound,

    #[error("Invalid device ID: {0}")]
    InvalidDeviceSelection(String),

    #[error("Invalid device ID: {index} ({reason})")]
    DeviceValidationFailed { index: usize, reason: String },

    #[error("Invalid number of channels: {0}")]
    InvalidChannelCount(usize),

    #[error("Failed to open capture stream on device {index}: {reason}")]
    DeviceUnavailable { index: usize, reason: String },

    #[error("Short read from device: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Failed to write {path}: {source}")]
    FilesystemWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio backend error: {0}")]
    Backend(String),
}

impl RecorderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecorderError::NoDeviceFound => ErrorKind::NoDeviceFound,
            RecorderError::InvalidDeviceSelection(_) => ErrorKind::InvalidDeviceSelection,
            RecorderError::DeviceValidationFailed { .. } => ErrorKind::DeviceValidationFailed,
            RecorderError::InvalidChannelCount(_) => ErrorKind::InvalidChannelCount,
            RecorderError::DeviceUnavailable { .. } => ErrorKind::DeviceUnavailable,
            RecorderError::ShortRead { .. } => ErrorKind::ShortRead,
            RecorderError::FilesystemWriteFailure { .. } => ErrorKind::FilesystemWriteFailure,
            RecorderError::InvalidSchedule(_) => ErrorKind::InvalidSchedule,
            RecorderError::Config(_) => ErrorKind::Config,
            RecorderError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Bad interactive input is recovered by re-prompting; everything else aborts the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RecorderError::InvalidDeviceSelection(_))
    }

    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RecorderError::FilesystemWriteFailure {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecorderError>;
