//! Mono WAV output for a single channel
//!
//! Layout: `<root>/<YYYY-MM-DD>/<label><suffix><epoch digits>.wav`. The same
//! relative path is used under both destination roots.

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use hound::{WavSpec, WavWriter};

use super::buffer::ChannelBuffer;
use super::config::{Destination, DestinationKind, SampleFormat, DEFAULT_SUFFIX};
use crate::errors::{RecorderError, Result};
use crate::timing::CaptureTimestamp;

/// File name for one channel of one segment.
pub fn segment_file_name(label: &str, suffix: &str, captured_at: &CaptureTimestamp) -> String {
    format!("{}{}{}.wav", label, suffix, captured_at.epoch_digits())
}

/// Dated directory a segment's files live in under `root`.
pub fn segment_dir(root: &Path, captured_at: &CaptureTimestamp) -> PathBuf {
    root.join(captured_at.date_string())
}

/// Writes channel buffers as single-channel WAV files.
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    suffix: String,
    sample_rate: u32,
    sample_format: SampleFormat,
}

impl ChannelWriter {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            sample_rate,
            sample_format: SampleFormat::Int16,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: self.sample_format.bits(),
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Write `buffer` under `root`, creating the dated directory if needed.
    ///
    /// An existing file with the same name is overwritten.
    pub fn write(
        &self,
        label: &str,
        buffer: &ChannelBuffer,
        captured_at: &CaptureTimestamp,
        root: &Path,
    ) -> Result<PathBuf> {
        let dir = segment_dir(root, captured_at);
        if !dir.is_dir() {
            fs::create_dir_all(&dir).map_err(|e| RecorderError::write_failure(&dir, e))?;
        }

        let path = dir.join(segment_file_name(label, &self.suffix, captured_at));
        self.write_wav(&path, buffer)?;

        log::info!(
            "Saved {} ({} frames @ {} Hz)",
            path.display(),
            buffer.frame_count(),
            self.sample_rate
        );
        Ok(path)
    }

    fn write_wav(&self, path: &Path, buffer: &ChannelBuffer) -> Result<()> {
        let to_io = |e: hound::Error| match e {
            hound::Error::IoError(io) => RecorderError::write_failure(path, io),
            other => RecorderError::write_failure(path, std::io::Error::other(other.to_string())),
        };

        let file = fs::File::create(path).map_err(|e| RecorderError::write_failure(path, e))?;
        let mut writer = WavWriter::new(BufWriter::new(file), self.spec()).map_err(to_io)?;

        for sample in buffer.samples() {
            writer.write_sample(sample).map_err(to_io)?;
        }
        writer.finalize().map_err(to_io)?;
        Ok(())
    }

    /// Write one channel to main and then backup.
    ///
    /// Each attempt is independent: a failure on one root does not skip the other.
    pub fn write_all_destinations(
        &self,
        label: &str,
        buffer: &ChannelBuffer,
        captured_at: &CaptureTimestamp,
        destination: &Destination,
    ) -> Vec<(DestinationKind, Result<PathBuf>)> {
        destination
            .roots()
            .into_iter()
            .map(|(kind, root)| (kind, self.write(label, buffer, captured_at, root)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn stamp() -> CaptureTimestamp {
        CaptureTimestamp::from_unix(1_700_000_000, 500_000).unwrap()
    }

    fn buffer(samples: &[i16]) -> ChannelBuffer {
        let mut b = ChannelBuffer::new();
        b.push_samples(samples);
        b
    }

    #[test]
    fn test_file_name_contract() {
        let name = segment_file_name("kitchen", "_channel_", &stamp());
        assert_eq!(name, "kitchen_channel_17000000005.wav");
    }

    #[test]
    fn test_write_creates_dated_directory() {
        let dir = tempdir().expect("tempdir");
        let root = dir.path().join("nested").join("data");
        let writer = ChannelWriter::new(8000);

        let path = writer.write("a", &buffer(&[1, 2, 3]), &stamp(), &root).unwrap();

        assert_eq!(path.parent().unwrap(), root.join(stamp().date_string()));
        assert!(path.exists());
    }

    #[test]
    fn test_written_header_is_mono() {
        let dir = tempdir().expect("tempdir");
        let writer = ChannelWriter::new(22050);
        let path = writer
            .write("a", &buffer(&[10, -10, 20, -20]), &stamp(), dir.path())
            .unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn test_payload_preserves_chunk_order() {
        let dir = tempdir().expect("tempdir");
        let mut b = ChannelBuffer::new();
        b.push_samples(&[1, 2]);
        b.push_samples(&[3]);
        b.push_samples(&[4, 5, 6]);

        let path = ChannelWriter::new(8000)
            .write("a", &b, &stamp(), dir.path())
            .unwrap();

        let samples: Vec<i16> = hound::WavReader::open(&path)
            .unwrap()
            .into_samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_same_name_overwrites() {
        let dir = tempdir().expect("tempdir");
        let writer = ChannelWriter::new(8000);
        let first = writer.write("a", &buffer(&[1; 100]), &stamp(), dir.path()).unwrap();
        let second = writer.write("a", &buffer(&[2; 3]), &stamp(), dir.path()).unwrap();
        assert_eq!(first, second);

        let reader = hound::WavReader::open(&second).unwrap();
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn test_custom_suffix() {
        let dir = tempdir().expect("tempdir");
        let writer = ChannelWriter::new(8000).with_suffix("-mic-");
        let path = writer.write("a", &buffer(&[1]), &stamp(), dir.path()).unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("a-mic-"));
    }

    #[test]
    fn test_backup_written_when_main_fails() {
        let dir = tempdir().expect("tempdir");
        // A regular file where the main root should be makes directory creation fail.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"not a directory").unwrap();
        let destination = Destination::new(&blocked, dir.path().join("backup"));

        let results = ChannelWriter::new(8000).write_all_destinations(
            "a",
            &buffer(&[1, 2]),
            &stamp(),
            &destination,
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, DestinationKind::Main);
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, DestinationKind::Backup);
        let backup = results[1].1.as_ref().unwrap();
        assert!(backup.exists());
    }
}
