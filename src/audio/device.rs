//! Input device enumeration and selection
//!
//! Devices are listed in backend index order and filtered to those that can
//! capture. A device is chosen once per run, re-validated at the moment of use,
//! and its native sample rate becomes the fixed capture rate for the session.

use std::io::{BufRead, Write};

use super::backend::{DeviceBackend, DeviceInfo};
use crate::errors::{RecorderError, Result};

/// How the recording device is picked from the enumerated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceChoice {
    /// Lowest-index input device
    First,
    /// A specific backend index, which must be an input device
    Index(usize),
    /// Ask on the prompt until a valid index is entered
    Interactive,
}

/// The device a run records from and the rate it records at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSession {
    pub device: DeviceInfo,
    pub sample_rate: u32,
}

/// Lazily walk the backend's devices, yielding only input-capable ones.
///
/// Devices whose description cannot be read are skipped.
pub fn input_devices<B: DeviceBackend + ?Sized>(
    backend: &B,
) -> impl Iterator<Item = DeviceInfo> + '_ {
    (0..backend.count_devices())
        .filter_map(move |index| backend.device_info(index).ok())
        .filter(DeviceInfo::is_input)
}

/// List all input-capable devices in index order.
///
/// # Errors
/// Returns `NoDeviceFound` when no device can capture.
pub fn enumerate_input_devices<B: DeviceBackend + ?Sized>(backend: &B) -> Result<Vec<DeviceInfo>> {
    let devices: Vec<DeviceInfo> = input_devices(backend)
        .inspect(|d| {
            log::info!(
                "Input Device id {} - {} - Channels: {}",
                d.index,
                d.name,
                d.max_input_channels
            )
        })
        .collect();

    if devices.is_empty() {
        return Err(RecorderError::NoDeviceFound);
    }
    Ok(devices)
}

/// Pick a device from an enumerated list.
///
/// `Interactive` re-prompts on non-numeric or unknown ids with no attempt limit;
/// the loop only ends on a valid answer or when `input` is exhausted.
pub fn select_device<R: BufRead, W: Write>(
    devices: &[DeviceInfo],
    choice: DeviceChoice,
    input: &mut R,
    output: &mut W,
) -> Result<DeviceInfo> {
    match choice {
        DeviceChoice::First => devices.first().cloned().ok_or(RecorderError::NoDeviceFound),
        DeviceChoice::Index(index) => find_device(devices, index)
            .cloned()
            .ok_or_else(|| RecorderError::InvalidDeviceSelection(index.to_string())),
        DeviceChoice::Interactive => prompt_for_device(devices, input, output),
    }
}

fn find_device(devices: &[DeviceInfo], index: usize) -> Option<&DeviceInfo> {
    devices.iter().find(|d| d.index == index)
}

fn parse_selection(devices: &[DeviceInfo], answer: &str) -> Result<DeviceInfo> {
    let answer = answer.trim();
    if answer.is_empty() || !answer.chars().all(|c| c.is_ascii_digit()) {
        return Err(RecorderError::InvalidDeviceSelection(answer.to_string()));
    }
    answer
        .parse::<usize>()
        .ok()
        .and_then(|index| find_device(devices, index))
        .cloned()
        .ok_or_else(|| RecorderError::InvalidDeviceSelection(answer.to_string()))
}

fn prompt_for_device<R: BufRead, W: Write>(
    devices: &[DeviceInfo],
    input: &mut R,
    output: &mut W,
) -> Result<DeviceInfo> {
    let io_err = |e: std::io::Error| RecorderError::Backend(format!("prompt failed: {e}"));

    for d in devices {
        writeln!(output, "Input Device id {} - {} - Channels: {}", d.index, d.name, d.max_input_channels)
            .map_err(io_err)?;
    }

    loop {
        write!(output, "Enter the ID of the preferred input device: ").map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_err)? == 0 {
            return Err(RecorderError::InvalidDeviceSelection(
                "input closed before a device was chosen".to_string(),
            ));
        }

        match parse_selection(devices, &line) {
            Ok(device) => return Ok(device),
            Err(e) => {
                writeln!(output, "{e}. Please try again.").map_err(io_err)?;
            }
        }
    }
}

/// Check that `index` still resolves to a real device right now.
pub fn validate<B: DeviceBackend + ?Sized>(backend: &B, index: usize) -> bool {
    match backend.device_info(index) {
        Ok(_) => true,
        Err(e) => {
            log::warn!("Device {} failed validation: {}", index, e);
            false
        }
    }
}

/// The device's native rate; no resampling happens anywhere downstream.
pub fn resolve_sample_rate(device: &DeviceInfo) -> u32 {
    device.default_sample_rate
}

/// Enumerate, choose, validate and fix the sample rate in one step.
pub fn open_session<B, R, W>(
    backend: &B,
    choice: DeviceChoice,
    input: &mut R,
    output: &mut W,
) -> Result<DeviceSession>
where
    B: DeviceBackend + ?Sized,
    R: BufRead,
    W: Write,
{
    let devices = enumerate_input_devices(backend)?;
    let device = select_device(&devices, choice, input, output)?;

    if !validate(backend, device.index) {
        return Err(RecorderError::DeviceValidationFailed {
            index: device.index,
            reason: "device no longer available".to_string(),
        });
    }

    let sample_rate = resolve_sample_rate(&device);
    log::info!(
        "Using input device {} - {} at {} Hz",
        device.index,
        device.name,
        sample_rate
    );

    Ok(DeviceSession {
        device,
        sample_rate,
    })
}
