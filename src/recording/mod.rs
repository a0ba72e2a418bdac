//! Segmented multi-channel recording
//!
//! A run is split into fixed-length segments. Each segment opens the device,
//! reads whole blocks, splits them per channel, and writes every channel as a
//! mono WAV file under both the main and the backup root.
//!
//! # Example
//! ```rust,ignore
//! use chanrec::recording::*;
//!
//! let config = CaptureConfig::new(device_index, sample_rate, 2);
//! let recorder = SegmentRecorder::new(config, ChannelWriter::new(sample_rate));
//! let summary = ScheduleDriver::new(backend, recorder).run(&schedule)?;
//! ```

mod buffer;
mod config;
mod recorder;
mod schedule;
mod writer;

pub use buffer::{ChannelBuffer, RecordingSegment};
pub use config::{
    required_blocks, CaptureConfig, ChannelLabels, Destination, DestinationKind, RunSummary,
    SampleFormat, SegmentReport, WrittenFile, DEFAULT_BLOCK_SIZE, DEFAULT_SUFFIX,
};
pub use recorder::{Clock, SegmentRecorder, SegmentState, StreamGuard};
pub use schedule::{segment_count, Schedule, ScheduleDriver, TimeUnit};
pub use writer::{segment_dir, segment_file_name, ChannelWriter};

#[cfg(test)]
mod tests;
