//! Recording configuration types

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{RecorderError, Result};

/// Default number of frames pulled from the device per read
pub const DEFAULT_BLOCK_SIZE: usize = 1024;

/// Default text placed between a channel label and the timestamp in file names
pub const DEFAULT_SUFFIX: &str = "_channel_";

/// PCM sample encoding used for capture and for the written files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Signed 16-bit little-endian
    #[default]
    Int16,
}

impl SampleFormat {
    /// Width of one sample in bytes
    pub fn bytes(&self) -> usize {
        match self {
            SampleFormat::Int16 => 2,
        }
    }

    pub fn bits(&self) -> u16 {
        (self.bytes() * 8) as u16
    }
}

/// Parameters of a capture stream, fixed for a whole session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub sample_format: SampleFormat,
    /// Number of interleaved channels requested from the device
    pub channels: usize,
    /// Frames per channel in each read
    pub block_size: usize,
    pub device_index: usize,
    /// Device native rate in Hz
    pub sample_rate: u32,
}

impl CaptureConfig {
    pub fn new(device_index: usize, sample_rate: u32, channels: usize) -> Self {
        Self {
            sample_format: SampleFormat::Int16,
            channels,
            block_size: DEFAULT_BLOCK_SIZE,
            device_index,
            sample_rate,
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Bytes expected from one full read
    pub fn block_bytes(&self) -> usize {
        self.block_size * self.channels * self.sample_format.bytes()
    }

    /// Number of reads needed to cover `seconds` of audio, rounded up.
    pub fn required_blocks(&self, seconds: u64) -> Result<u64> {
        required_blocks(self.sample_rate, self.block_size, seconds)
    }
}

/// `ceil(sample_rate / block_size * seconds)` in exact integer arithmetic.
///
/// # Errors
/// `InvalidSchedule` for a zero block size or a duration whose frame count
/// does not fit in a `u64`.
pub fn required_blocks(sample_rate: u32, block_size: usize, seconds: u64) -> Result<u64> {
    if block_size == 0 {
        return Err(RecorderError::InvalidSchedule(
            "block size must be at least one frame".to_string(),
        ));
    }
    let total = u64::from(sample_rate).checked_mul(seconds).ok_or_else(|| {
        RecorderError::InvalidSchedule(format!(
            "{} seconds at {} Hz is too long to record",
            seconds, sample_rate
        ))
    })?;
    Ok(total.div_ceil(block_size as u64))
}

/// Ordered channel names; label `i` names channel `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLabels(Vec<String>);

impl ChannelLabels {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(|s| s.into().trim().to_string()).collect();
        if labels.is_empty() {
            return Err(RecorderError::Config("at least one channel label is required".to_string()));
        }
        if let Some(pos) = labels.iter().position(String::is_empty) {
            return Err(RecorderError::Config(format!("channel label {} is empty", pos + 1)));
        }
        Ok(Self(labels))
    }

    /// Parse a comma-separated list such as `"channel_1,channel_2"`.
    pub fn parse(list: &str) -> Result<Self> {
        Self::new(list.split(','))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, channel: usize) -> Option<&str> {
        self.0.get(channel).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Labels paired with their channel index, limited to `channels`.
    pub fn mapped(&self, channels: usize) -> impl Iterator<Item = (usize, &str)> {
        self.iter().take(channels).enumerate()
    }
}

impl FromStr for ChannelLabels {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Which of the two destination roots a file went to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestinationKind {
    Main,
    Backup,
}

impl std::fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationKind::Main => write!(f, "main"),
            DestinationKind::Backup => write!(f, "backup"),
        }
    }
}

/// Primary and backup output roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub main_root: PathBuf,
    pub backup_root: PathBuf,
}

impl Destination {
    pub fn new(main_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            main_root: main_root.into(),
            backup_root: backup_root.into(),
        }
    }

    /// Resolve relative roots against `base`; absolute roots are kept as-is.
    pub fn resolve(main: impl AsRef<Path>, backup: impl AsRef<Path>, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            main_root: base.join(main),
            backup_root: base.join(backup),
        }
    }

    /// Roots in write order: main first, then backup
    pub fn roots(&self) -> [(DestinationKind, &Path); 2] {
        [
            (DestinationKind::Main, self.main_root.as_path()),
            (DestinationKind::Backup, self.backup_root.as_path()),
        ]
    }
}

/// Files and failures produced by one segment
#[derive(Debug, Default)]
pub struct SegmentReport {
    /// 1-based position of the segment in its run
    pub segment: u64,
    /// Every file written, in write order
    pub written: Vec<WrittenFile>,
    /// Every write that failed; the other writes were still attempted
    pub failures: Vec<RecorderError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub channel: usize,
    pub label: String,
    pub destination: DestinationKind,
    pub path: PathBuf,
}

/// Outcome of a completed schedule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub segments_planned: u64,
    pub segments_completed: u64,
    pub files: Vec<WrittenFile>,
}

impl RunSummary {
    pub fn files_written(&self) -> usize {
        self.files.len()
    }
}
