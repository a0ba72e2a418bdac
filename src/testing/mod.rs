//! Testing utilities for chanrec
//!
//! Provides a scripted device backend so the recording pipeline can be
//! exercised end to end without audio hardware.

pub mod synthetic_data;

pub use synthetic_data::{synthetic_block, SyntheticBackend, SyntheticStats};
