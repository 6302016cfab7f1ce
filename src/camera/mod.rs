//! Camera discovery, configuration and capture.
//!
//! This module provides a high-level API for camera capture operations:
//! - Device enumeration and session lifecycle via [`CaptureController`]
//! - Format and frame-rate selection via [`select_format`] and
//!   [`select_frame_rate_range`]
//! - Backends: [`PatternBackend`] (always available) and `NativeBackend`
//!   (with the `native-camera` feature)

mod backend;
mod capture;
mod capture_loop;
mod format;
pub mod frame_utils;
#[cfg(feature = "native-camera")]
pub mod native;
mod pattern;
mod types;

pub use backend::{CaptureBackend, FrameObserver, FrameStream, Sample};
pub use capture::{CaptureController, SessionHandle, SessionState};
pub use capture_loop::CaptureStats;
pub use format::{
    frame_duration_bounds, max_frame_rate, select_format, select_frame_rate_range,
    MIN_PREFERRED_FRAME_RATE,
};
#[cfg(feature = "native-camera")]
pub use native::NativeBackend;
pub use pattern::{render_pattern, Pattern, PatternBackend, PatternStream};
pub use types::{
    ActiveConfiguration, CameraError, ColorSpace, Device, Format, Frame, FrameDurationBounds,
    FrameRateRange, PixelEncoding, Resolution,
};
