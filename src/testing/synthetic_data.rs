//! Scripted in-memory audio backend
//!
//! Stands in for real hardware: devices are declared up front, reads are served
//! from a queue of interleaved blocks (optionally followed by a generated
//! ramp), and every lifecycle call is counted so tests can check that streams
//! and sessions were released.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::audio::{samples_to_le_bytes, DeviceBackend, DeviceInfo, InputStream};
use crate::errors::{RecorderError, Result};
use crate::recording::CaptureConfig;

/// Lifecycle counters observed by a [`SyntheticBackend`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyntheticStats {
    pub opened: usize,
    pub reads: usize,
    pub stopped: usize,
    pub closed: usize,
    pub terminated: usize,
    /// Streams currently open (opened but not yet closed)
    pub open_now: usize,
    /// Largest number of streams ever open at once
    pub max_open: usize,
}

#[derive(Debug, Default)]
struct State {
    devices: Vec<DeviceInfo>,
    removed: HashSet<usize>,
    vanishing: HashSet<usize>,
    blocks: VecDeque<Vec<i16>>,
    ramp: Option<i16>,
    opens_allowed: Option<usize>,
    stats: SyntheticStats,
}

/// In-memory [`DeviceBackend`]. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct SyntheticBackend {
    state: Rc<RefCell<State>>,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a device at the next index.
    pub fn with_device(self, name: &str, max_input_channels: u16, sample_rate: u32) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let index = state.devices.len();
            state.devices.push(DeviceInfo {
                index,
                name: name.to_string(),
                max_input_channels,
                default_sample_rate: sample_rate,
            });
        }
        self
    }

    /// Queue interleaved blocks served by successive reads, one block per read.
    pub fn with_blocks(self, blocks: Vec<Vec<i16>>) -> Self {
        self.state.borrow_mut().blocks.extend(blocks);
        self
    }

    /// Once queued blocks run out, serve full blocks of a counting ramp.
    pub fn with_ramp(self) -> Self {
        self.state.borrow_mut().ramp = Some(0);
        self
    }

    /// Let `n` streams open successfully; later opens fail.
    pub fn fail_open_after(self, n: usize) -> Self {
        self.state.borrow_mut().opens_allowed = Some(n);
        self
    }

    /// The device resolves once more, then disappears.
    pub fn vanish_after_enumeration(self, index: usize) -> Self {
        self.state.borrow_mut().vanishing.insert(index);
        self
    }

    pub fn remove_device(&self, index: usize) {
        self.state.borrow_mut().removed.insert(index);
    }

    pub fn stats(&self) -> SyntheticStats {
        self.state.borrow().stats
    }
}

impl DeviceBackend for SyntheticBackend {
    fn count_devices(&self) -> usize {
        self.state.borrow().devices.len()
    }

    fn device_info(&self, index: usize) -> Result<DeviceInfo> {
        let mut state = self.state.borrow_mut();
        if state.removed.contains(&index) {
            return Err(RecorderError::Backend(format!("device {} was removed", index)));
        }
        let info = state
            .devices
            .get(index)
            .cloned()
            .ok_or_else(|| RecorderError::Backend(format!("No device at index {}", index)))?;
        if state.vanishing.remove(&index) {
            state.removed.insert(index);
        }
        Ok(info)
    }

    fn open_stream(&mut self, config: &CaptureConfig) -> Result<Box<dyn InputStream>> {
        let mut state = self.state.borrow_mut();
        let unavailable = |reason: &str| RecorderError::DeviceUnavailable {
            index: config.device_index,
            reason: reason.to_string(),
        };

        if state.stats.terminated > 0 {
            return Err(unavailable("session terminated"));
        }
        if let Some(allowed) = state.opens_allowed {
            if state.stats.opened >= allowed {
                return Err(unavailable("device busy"));
            }
        }
        if state.removed.contains(&config.device_index) {
            return Err(unavailable("device removed"));
        }
        let device = state
            .devices
            .get(config.device_index)
            .ok_or_else(|| unavailable("no such device"))?;
        if config.channels > device.max_input_channels as usize {
            return Err(unavailable("too many channels requested"));
        }

        state.stats.opened += 1;
        state.stats.open_now += 1;
        state.stats.max_open = state.stats.max_open.max(state.stats.open_now);

        Ok(Box::new(SyntheticStream {
            state: self.state.clone(),
            channels: config.channels,
            closed: false,
        }))
    }

    fn terminate(&mut self) {
        self.state.borrow_mut().stats.terminated += 1;
    }
}

struct SyntheticStream {
    state: Rc<RefCell<State>>,
    channels: usize,
    closed: bool,
}

impl InputStream for SyntheticStream {
    fn read(&mut self, block_size: usize) -> Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.stats.reads += 1;

        if let Some(block) = state.blocks.pop_front() {
            return Ok(samples_to_le_bytes(&block));
        }

        match state.ramp {
            Some(start) => {
                let len = block_size * self.channels;
                let block: Vec<i16> = (0..len).map(|i| start.wrapping_add(i as i16)).collect();
                state.ramp = Some(start.wrapping_add(len as i16));
                Ok(samples_to_le_bytes(&block))
            }
            None => Ok(Vec::new()),
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.state.borrow_mut().stats.stopped += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            let mut state = self.state.borrow_mut();
            state.stats.closed += 1;
            state.stats.open_now -= 1;
        }
        Ok(())
    }
}

/// Interleaved test block where sample `f * channels + c` is `base + f * channels + c`.
pub fn synthetic_block(base: i16, frames: usize, channels: usize) -> Vec<i16> {
    (0..frames * channels)
        .map(|i| base.wrapping_add(i as i16))
        .collect()
}
