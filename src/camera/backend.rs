//! Seams between the capture controller and a concrete camera stack.

use super::types::{ActiveConfiguration, CameraError, Device, Frame};

/// Outcome of pulling one sample from a running stream.
#[derive(Debug)]
pub enum Sample {
    /// A decoded frame ready for delivery
    Frame(Frame),
    /// The capture layer discarded a late or undecodable sample
    Dropped,
}

/// A camera stack able to list devices and open capture streams.
///
/// `open` is always called on the capture thread, so streams do not need to
/// be `Send`.
pub trait CaptureBackend: Send + Sync + 'static {
    type Stream: FrameStream;

    /// Devices in discovery order.
    fn devices(&self) -> Result<Vec<Device>, CameraError>;

    /// Lock the device, apply `config` and start streaming.
    fn open(&self, config: &ActiveConfiguration) -> Result<Self::Stream, CameraError>;
}

/// A running capture stream owned by the capture thread.
pub trait FrameStream {
    /// Block until the next sample is available.
    fn next_sample(&mut self) -> Result<Sample, CameraError>;

    /// Release the device. Called exactly once before the stream is dropped.
    fn close(&mut self);
}

/// Receives frames from the capture thread.
///
/// Calls never overlap for one session; implementations should return
/// within one frame interval.
pub trait FrameObserver: Send + Sync {
    fn did_capture_frame(&self, frame: Frame);
}
