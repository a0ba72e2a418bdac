//! Turning a total recording budget into a sequence of segments

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::{ChannelLabels, Destination, RunSummary};
use super::recorder::SegmentRecorder;
use crate::audio::DeviceBackend;
use crate::errors::{RecorderError, Result};

/// Unit of the total recording budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn seconds_per_unit(&self) -> u64 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => 60,
            TimeUnit::Hours => 3600,
        }
    }

    /// `value` units in seconds, or `None` if that overflows.
    pub fn to_seconds(&self, value: u64) -> Option<u64> {
        value.checked_mul(self.seconds_per_unit())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hour" | "hours" => Ok(TimeUnit::Hours),
            other => Err(RecorderError::InvalidSchedule(format!(
                "unknown time unit '{}' (expected seconds, minutes or hours)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of whole segments that fit in the budget.
///
/// Any remainder shorter than one segment is dropped, never recorded.
pub fn segment_count(total: u64, unit: TimeUnit, segment_length_secs: u64) -> Result<u64> {
    if segment_length_secs == 0 {
        return Err(RecorderError::InvalidSchedule(
            "segment length must be at least one second".to_string(),
        ));
    }
    let seconds = unit.to_seconds(total).ok_or_else(|| {
        RecorderError::InvalidSchedule(format!("{} {} does not fit in seconds", total, unit))
    })?;
    Ok(seconds / segment_length_secs)
}

/// What to record and where to put it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub total: u64,
    pub unit: TimeUnit,
    pub segment_length_secs: u64,
    pub labels: ChannelLabels,
    pub destination: Destination,
}

/// Runs a schedule once, then releases the device session for good.
pub struct ScheduleDriver<B: DeviceBackend> {
    backend: B,
    recorder: SegmentRecorder,
}

impl<B: DeviceBackend> ScheduleDriver<B> {
    pub fn new(backend: B, recorder: SegmentRecorder) -> Self {
        Self { backend, recorder }
    }

    /// Record every segment of `schedule` in sequence.
    ///
    /// The first fatal error stops the run; files already written stay in
    /// place. The backend is terminated on every path.
    pub fn run(mut self, schedule: &Schedule) -> Result<RunSummary> {
        let result = self.run_segments(schedule);
        self.backend.terminate();
        match &result {
            Ok(summary) => log::info!(
                "Run complete: {} segments, {} files",
                summary.segments_completed,
                summary.files_written()
            ),
            Err(e) => log::error!("Run aborted ({}): {}", e.kind(), e),
        }
        result
    }

    fn run_segments(&mut self, schedule: &Schedule) -> Result<RunSummary> {
        let planned = segment_count(schedule.total, schedule.unit, schedule.segment_length_secs)?;

        let channels = self.recorder.config().channels;
        if schedule.labels.len() < channels {
            log::warn!(
                "{} channels configured but only {} labels; channels {}..{} will not be saved",
                channels,
                schedule.labels.len(),
                schedule.labels.len() + 1,
                channels
            );
        } else if schedule.labels.len() > channels {
            log::warn!(
                "Ignoring {} labels beyond the {} configured channels",
                schedule.labels.len() - channels,
                channels
            );
        }

        let mut summary = RunSummary {
            segments_planned: planned,
            ..RunSummary::default()
        };

        for k in 0..planned {
            log::info!("Recording segment {}/{}", k + 1, planned);
            let mut report = self.recorder.record_and_save(
                &mut self.backend,
                schedule.segment_length_secs,
                &schedule.labels,
                &schedule.destination,
            )?;
            report.segment = k + 1;
            log::debug!("Segment {} wrote {} files", report.segment, report.written.len());
            summary.files.append(&mut report.written);
            summary.segments_completed += 1;
        }

        Ok(summary)
    }
}
