//! chanrec: segmented multi-channel audio capture
//!
//! Records a fixed total duration from one input device in fixed-length
//! segments. Every channel of every segment is saved as its own mono WAV file,
//! once under a main root and once under a backup root.
//!
//! # Features
//! - Input device enumeration and interactive or scripted selection
//! - Block-exact capture with guaranteed stream release
//! - Per-channel demultiplexing of interleaved 16-bit frames
//! - Date-partitioned, timestamp-named output in two locations
//! - TOML configuration with command line overrides
//!
//! # Usage
//! ```toml
//! [dependencies]
//! chanrec = { version = "0.1", features = ["audio"] }
//! ```
//!
//! ```rust,ignore
//! use chanrec::audio::{open_session, CpalBackend, DeviceChoice};
//! use chanrec::recording::*;
//!
//! let backend = CpalBackend::new();
//! let session = open_session(&backend, DeviceChoice::First, &mut stdin, &mut stdout)?;
//! let config = CaptureConfig::new(session.device.index, session.sample_rate, 2);
//! let recorder = SegmentRecorder::new(config, ChannelWriter::new(session.sample_rate));
//! let summary = ScheduleDriver::new(backend, recorder).run(&schedule)?;
//! ```
pub mod audio;
pub mod config;
pub mod errors;
pub mod prompt;
pub mod recording;
pub mod timing;

// Testing utilities - scripted backend for offline testing
pub mod testing;

// Re-exports for convenience
pub use config::RecorderConfig;
pub use errors::{ErrorKind, RecorderError};
pub use recording::{
    CaptureConfig, ChannelLabels, ChannelWriter, Destination, RunSummary, Schedule,
    ScheduleDriver, SegmentRecorder, TimeUnit,
};
pub use timing::CaptureTimestamp;

/// Initialize logging for the recorder
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "chanrec=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        audio_backend: cfg!(feature = "audio"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    /// Whether the cpal device backend was compiled in
    pub audio_backend: bool,
}
