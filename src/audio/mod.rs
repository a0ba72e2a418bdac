//! Audio device access for chanrec
//!
//! Submodules:
//! - `backend`: the device capability traits the recorder consumes
//! - `device`: input device enumeration, selection and validation
//! - `demux`: interleaved block splitting
//! - `capture`: cpal implementation of the backend (feature `audio`)

mod backend;
mod demux;
mod device;

#[cfg(feature = "audio")]
mod capture;

pub use backend::{DeviceBackend, DeviceInfo, InputStream};
pub use demux::{demux, interleave, samples_from_le_bytes, samples_to_le_bytes};
pub use device::{
    enumerate_input_devices, input_devices, open_session, resolve_sample_rate, select_device,
    validate, DeviceChoice, DeviceSession,
};

#[cfg(feature = "audio")]
pub use capture::CpalBackend;
