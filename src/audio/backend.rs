//! Device capability seam
//!
//! The recorder never talks to an audio API directly. It consumes a
//! [`DeviceBackend`] that can count devices, describe one by index, and open a
//! blocking [`InputStream`] of interleaved 16-bit frames.

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::recording::CaptureConfig;

/// Description of one device as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Position of the device in the backend's enumeration
    pub index: usize,
    /// Human-readable device name
    pub name: String,
    /// Largest number of input channels the device can capture (0 = output only)
    pub max_input_channels: u16,
    /// Native sample rate in Hz
    pub default_sample_rate: u32,
}

impl DeviceInfo {
    pub fn is_input(&self) -> bool {
        self.max_input_channels > 0
    }
}

/// An open capture stream.
///
/// `read` blocks until `block_size` frames of every channel are available and
/// returns them interleaved as little-endian i16 bytes. A stream that cannot
/// deliver the full block returns fewer bytes; the caller decides what a short
/// read means.
pub trait InputStream {
    fn read(&mut self, block_size: usize) -> Result<Vec<u8>>;
    fn stop(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

/// Access to the host audio system for the lifetime of a recording session.
pub trait DeviceBackend {
    fn count_devices(&self) -> usize;

    fn device_info(&self, index: usize) -> Result<DeviceInfo>;

    fn open_stream(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>>;

    /// Release the audio session. Called once when a run ends; must be idempotent.
    fn terminate(&mut self);
}

impl<B: DeviceBackend + ?Sized> DeviceBackend for Box<B> {
    fn count_devices(&self) -> usize {
        (**self).count_devices()
    }

    fn device_info(&self, index: usize) -> Result<DeviceInfo> {
        (**self).device_info(index)
    }

    fn open_stream(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>> {
        (**self).open_stream(config)
    }

    fn terminate(&mut self) {
        (**self).terminate()
    }
}
