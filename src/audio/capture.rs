//! cpal-backed device capability
//!
//! Devices are addressed by their position in `host.devices()`, re-queried on
//! every lookup so a device removed mid-run stops resolving. Streams deliver
//! interleaved i16 frames from the realtime callback over a channel to a
//! blocking reader.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::{Receiver, Sender};

use super::backend::{DeviceBackend, DeviceInfo, InputStream};
use super::demux::samples_to_le_bytes;
use crate::errors::{RecorderError, Result};
use crate::recording::CaptureConfig;

type SharedSender = Arc<Mutex<Option<Sender<Vec<i16>>>>>;

/// Host audio system accessed through cpal's default host.
pub struct CpalBackend {
    host: cpal::Host,
    terminated: bool,
}

impl CpalBackend {
    pub fn new() -> Self {
        let host = cpal::default_host();
        log::debug!("Using audio host {:?}", host.id());
        Self {
            host,
            terminated: false,
        }
    }

    fn nth_device(&self, index: usize) -> Result<cpal::Device> {
        self.host
            .devices()
            .map_err(|e| RecorderError::Backend(format!("Failed to enumerate audio devices: {}", e)))?
            .nth(index)
            .ok_or_else(|| RecorderError::Backend(format!("No device at index {}", index)))
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBackend for CpalBackend {
    fn count_devices(&self) -> usize {
        match self.host.devices() {
            Ok(devices) => devices.count(),
            Err(e) => {
                log::error!("Failed to enumerate audio devices: {}", e);
                0
            }
        }
    }

    fn device_info(&self, index: usize) -> Result<DeviceInfo> {
        let device = self.nth_device(index)?;
        let name = device
            .name()
            .map_err(|e| RecorderError::Backend(format!("Failed to get device name: {}", e)))?;

        let max_input_channels = device
            .supported_input_configs()
            .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
            .unwrap_or(0);

        let default_sample_rate = device
            .default_input_config()
            .map(|c| c.sample_rate().0)
            .unwrap_or(0);

        Ok(DeviceInfo {
            index,
            name,
            max_input_channels,
            default_sample_rate,
        })
    }

    fn open_stream(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>> {
        if self.terminated {
            return Err(RecorderError::Backend("audio session already terminated".to_string()));
        }

        let unavailable = |reason: String| RecorderError::DeviceUnavailable {
            index: config.device_index,
            reason,
        };

        let device = self
            .nth_device(config.device_index)
            .map_err(|e| unavailable(e.to_string()))?;

        let sample_format = device
            .default_input_config()
            .map_err(|e| unavailable(format!("No supported config: {}", e)))?
            .sample_format();

        let channels = u16::try_from(config.channels)
            .map_err(|_| RecorderError::InvalidChannelCount(config.channels))?;
        let stream_config = StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // Unbounded; the callback must never drop frames.
        let (sender, receiver) = crossbeam_channel::unbounded();
        let sender: SharedSender = Arc::new(Mutex::new(Some(sender)));

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, sender),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, sender),
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, sender),
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, sender),
            other => Err(format!("Unsupported sample format {:?}", other)),
        }
        .map_err(unavailable)?;

        stream
            .play()
            .map_err(|e| unavailable(format!("Failed to start stream: {}", e)))?;

        log::debug!(
            "Opened {}-channel stream on device {} at {} Hz ({:?} source)",
            config.channels,
            config.device_index,
            config.sample_rate,
            sample_format
        );

        Ok(Box::new(CpalInputStream {
            stream: Some(stream),
            receiver,
            pending: VecDeque::new(),
            channels: config.channels,
        }))
    }

    fn terminate(&mut self) {
        if !self.terminated {
            self.terminated = true;
            log::debug!("Audio session terminated");
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    sender: SharedSender,
) -> std::result::Result<Stream, String>
where
    T: SizedSample + Send + 'static,
    i16: FromSample<T>,
{
    let data_sender = sender.clone();
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data.iter().map(|&s| s.to_sample::<i16>()).collect();
                if let Ok(guard) = data_sender.lock() {
                    if let Some(tx) = guard.as_ref() {
                        let _ = tx.send(samples);
                    }
                }
            },
            move |err| {
                log::error!("Audio capture error: {}", err);
                if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                    // Disconnects the reader so the pending read comes back short.
                    if let Ok(mut guard) = sender.lock() {
                        guard.take();
                    }
                }
            },
            None,
        )
        .map_err(|e| format!("Failed to build stream: {}", e))
}

struct CpalInputStream {
    stream: Option<Stream>,
    receiver: Receiver<Vec<i16>>,
    pending: VecDeque<i16>,
    channels: usize,
}

impl InputStream for CpalInputStream {
    fn read(&mut self, block_size: usize) -> Result<Vec<u8>> {
        let wanted = block_size * self.channels;
        while self.pending.len() < wanted {
            match self.receiver.recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(_) => break,
            }
        }

        let take = wanted.min(self.pending.len());
        let block: Vec<i16> = self.pending.drain(..take).collect();
        Ok(samples_to_le_bytes(&block))
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(ref stream) = self.stream {
            stream
                .pause()
                .map_err(|e| RecorderError::Backend(format!("Failed to stop stream: {}", e)))?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.stream.take();
        self.pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_no_panic() {
        // Should not panic even without audio hardware
        let backend = CpalBackend::new();
        for index in 0..backend.count_devices() {
            let _ = backend.device_info(index);
        }
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let backend = CpalBackend::new();
        assert!(backend.device_info(usize::MAX).is_err());
    }

    #[test]
    fn test_open_after_terminate_fails() {
        let mut backend = CpalBackend::new();
        backend.terminate();
        let config = CaptureConfig::new(0, 48000, 2);
        assert!(backend.open_stream(&config).is_err());
    }
}
