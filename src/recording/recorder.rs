//! One bounded capture segment: open, read, drain, write
//!
//! The stream handle is wrapped in a guard that stops and closes it on every
//! exit path, so a failed read never leaves the device open.

use super::buffer::RecordingSegment;
use super::config::{CaptureConfig, ChannelLabels, Destination, SegmentReport, WrittenFile};
use super::writer::ChannelWriter;
use crate::audio::{samples_from_le_bytes, DeviceBackend, InputStream};
use crate::errors::{RecorderError, Result};
use crate::timing::CaptureTimestamp;

/// Lifecycle of a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Idle,
    StreamOpen,
    Reading,
    Draining,
    Closed,
}

/// Owns an open stream and releases it exactly once.
pub struct StreamGuard {
    stream: Option<Box<dyn InputStream>>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn InputStream>) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn read(&mut self, block_size: usize) -> Result<Vec<u8>> {
        match self.stream.as_mut() {
            Some(stream) => stream.read(block_size),
            None => Err(RecorderError::Backend("stream already released".to_string())),
        }
    }

    /// Stop and close the stream. Both steps run even if stopping fails.
    pub fn release(&mut self) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };
        let stopped = stream.stop();
        let closed = stream.close();
        stopped.and(closed)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("Error releasing capture stream: {}", e);
        }
    }
}

/// Source of segment capture timestamps
pub type Clock = Box<dyn FnMut() -> CaptureTimestamp>;

/// Records segments from a fixed device and hands them to a [`ChannelWriter`].
pub struct SegmentRecorder {
    config: CaptureConfig,
    writer: ChannelWriter,
    state: SegmentState,
    clock: Clock,
}

impl SegmentRecorder {
    pub fn new(config: CaptureConfig, writer: ChannelWriter) -> Self {
        Self {
            config,
            writer,
            state: SegmentState::Idle,
            clock: Box::new(CaptureTimestamp::now),
        }
    }

    /// Replace the wall clock used to stamp finished segments.
    pub fn with_clock(mut self, clock: impl FnMut() -> CaptureTimestamp + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> SegmentState {
        self.state
    }

    /// Capture `seconds` of audio into fresh per-channel buffers.
    ///
    /// # Errors
    /// `InvalidChannelCount`, or `InvalidSchedule` for a zero block size or an
    /// unrepresentable duration, before the device is touched. `DeviceUnavailable`
    /// if the stream cannot be opened, `ShortRead` if any block comes back
    /// incomplete. The stream is released in every case.
    pub fn record<B: DeviceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        seconds: u64,
    ) -> Result<RecordingSegment> {
        if self.config.channels < 1 {
            return Err(RecorderError::InvalidChannelCount(self.config.channels));
        }

        let blocks = self.config.required_blocks(seconds)?;
        let mut segment = RecordingSegment::new(self.config.channels);
        log::info!(
            "Recording {}s on device {} ({} blocks of {} frames)",
            seconds,
            self.config.device_index,
            blocks,
            self.config.block_size
        );

        self.state = SegmentState::StreamOpen;
        let mut guard = match backend.open_stream(&self.config) {
            Ok(stream) => StreamGuard::new(stream),
            Err(e) => {
                self.state = SegmentState::Closed;
                return Err(e);
            }
        };

        self.state = SegmentState::Reading;
        let read_result = self.read_blocks(&mut guard, &mut segment, blocks);

        self.state = SegmentState::Draining;
        let release_result = guard.release();
        self.state = SegmentState::Closed;

        read_result?;
        if let Err(e) = release_result {
            log::warn!("Error releasing capture stream: {}", e);
        }

        segment.captured_at = (self.clock)();
        log::info!("Finished recording");
        Ok(segment)
    }

    fn read_blocks(
        &self,
        guard: &mut StreamGuard,
        segment: &mut RecordingSegment,
        blocks: u64,
    ) -> Result<()> {
        let expected = self.config.block_bytes();
        for _ in 0..blocks {
            let bytes = guard.read(self.config.block_size)?;
            if bytes.len() < expected {
                return Err(RecorderError::ShortRead {
                    expected,
                    actual: bytes.len(),
                });
            }
            segment.append_block(&samples_from_le_bytes(&bytes[..expected]))?;
        }
        Ok(())
    }

    /// Write every labelled channel of `segment` to both destinations.
    ///
    /// Order is channel index, then main before backup. All writes are
    /// attempted; failures are collected in the report.
    pub fn save(
        &self,
        segment: &RecordingSegment,
        labels: &ChannelLabels,
        destination: &Destination,
    ) -> SegmentReport {
        let mut report = SegmentReport::default();
        for (channel, label) in labels.mapped(segment.channels()) {
            let buffer = &segment.channel_buffers[channel];
            for (kind, result) in
                self.writer
                    .write_all_destinations(label, buffer, &segment.captured_at, destination)
            {
                match result {
                    Ok(path) => report.written.push(WrittenFile {
                        channel,
                        label: label.to_string(),
                        destination: kind,
                        path,
                    }),
                    Err(e) => {
                        log::error!("Failed to save {} copy of '{}': {}", kind, label, e);
                        report.failures.push(e);
                    }
                }
            }
        }
        report
    }

    /// Record one segment and save it; the first write failure is returned
    /// after all writes of the segment were attempted.
    pub fn record_and_save<B: DeviceBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        seconds: u64,
        labels: &ChannelLabels,
        destination: &Destination,
    ) -> Result<SegmentReport> {
        let segment = self.record(backend, seconds)?;
        let mut report = self.save(&segment, labels, destination);
        if !report.failures.is_empty() {
            return Err(report.failures.remove(0));
        }
        Ok(report)
    }
}
