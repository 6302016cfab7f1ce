//! Camera types and data structures.

use std::fmt;
use std::time::{Duration, Instant};

/// A capture resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in one image at this resolution.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pixel encoding a device produces for a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelEncoding {
    Mjpeg,
    Yuyv,
    Nv12,
    Gray,
    Rgb,
    Rgba,
}

impl fmt::Display for PixelEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelEncoding::Mjpeg => "MJPEG",
            PixelEncoding::Yuyv => "YUYV",
            PixelEncoding::Nv12 => "NV12",
            PixelEncoding::Gray => "GRAY",
            PixelEncoding::Rgb => "RGB",
            PixelEncoding::Rgba => "RGBA",
        };
        f.write_str(name)
    }
}

/// A contiguous range of frame rates a format supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateRange {
    pub min_rate: f64,
    pub max_rate: f64,
}

impl FrameRateRange {
    pub fn new(min_rate: f64, max_rate: f64) -> Self {
        Self { min_rate, max_rate }
    }

    /// A range that supports exactly one rate.
    pub fn fixed(rate: f64) -> Self {
        Self::new(rate, rate)
    }

    /// Shortest interval between frames, reached at `max_rate`.
    pub fn min_frame_duration(&self) -> Duration {
        rate_to_duration(self.max_rate)
    }

    /// Longest interval between frames, reached at `min_rate`.
    pub fn max_frame_duration(&self) -> Duration {
        rate_to_duration(self.min_rate)
    }
}

fn rate_to_duration(rate: f64) -> Duration {
    if rate > 0.0 {
        Duration::from_secs_f64(1.0 / rate)
    } else {
        Duration::ZERO
    }
}

/// A capture mode reported by a device.
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub resolution: Resolution,
    pub encoding: PixelEncoding,
    pub frame_rates: Vec<FrameRateRange>,
}

impl Format {
    pub fn new(resolution: Resolution, encoding: PixelEncoding, frame_rates: Vec<FrameRateRange>) -> Self {
        Self {
            resolution,
            encoding,
            frame_rates,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.resolution, self.encoding)?;
        let rates: Vec<String> = self
            .frame_rates
            .iter()
            .map(|r| {
                if r.min_rate == r.max_rate {
                    format!("{}", r.max_rate)
                } else {
                    format!("{}-{}", r.min_rate, r.max_rate)
                }
            })
            .collect();
        if !rates.is_empty() {
            write!(f, " @ {} fps", rates.join(", "))?;
        }
        Ok(())
    }
}

/// A camera device as discovered at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Backend-specific identifier
    pub id: String,
    /// Human-readable device name
    pub name: String,
    /// Capture modes in the order the backend reported them
    pub formats: Vec<Format>,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Frame-duration bounds applied to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDurationBounds {
    pub min: Duration,
    pub max: Duration,
}

impl FrameDurationBounds {
    /// Frame rate the session aims for when running flat out.
    pub fn target_rate(&self) -> f64 {
        if self.min.is_zero() {
            0.0
        } else {
            1.0 / self.min.as_secs_f64()
        }
    }
}

/// Everything needed to open a capture session on one device.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveConfiguration {
    pub device: Device,
    pub format: Format,
    pub frame_durations: Option<FrameDurationBounds>,
    /// Encoding frames are decoded into before delivery
    pub output_encoding: PixelEncoding,
}

impl fmt::Display for ActiveConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} using {}", self.device.name, self.format)?;
        if let Some(bounds) = self.frame_durations {
            write!(
                f,
                " (frame duration {:?}..{:?})",
                bounds.min, bounds.max
            )?;
        }
        Ok(())
    }
}

/// Color space of decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Values are sRGB-encoded
    #[default]
    Srgb,
    /// Values are in the device's native RGB space, treated as linear
    DeviceRgb,
}

/// A decoded camera frame in RGBA layout.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Tightly packed RGBA pixels, row-major
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Monotonic counter within one session
    pub sequence: u64,
    /// When the frame was captured
    pub timestamp: Instant,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 4;

    pub fn extent(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Bytes in a single row of pixels.
    pub fn stride(&self) -> usize {
        self.width as usize * Self::BYTES_PER_PIXEL
    }

    /// Bytes needed to hold every pixel.
    pub fn expected_len(&self) -> usize {
        self.stride() * self.height as usize
    }

    /// Whether `data` covers the whole extent.
    pub fn is_complete(&self) -> bool {
        self.data.len() >= self.expected_len()
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("No cameras found")]
    NoDevices,
    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),
    #[error("Failed to open camera: {0}")]
    OpenFailed(String),
    #[error(
        "Camera permission denied. On macOS, grant access in System Settings > Privacy & Security > Camera"
    )]
    PermissionDenied,
    #[error("Camera device {0} not found. Run 'list-devices' to see available devices")]
    DeviceNotFound(usize),
    #[error("Camera '{0}' reports no capture formats")]
    NoFormats(String),
    #[error("Camera rejected configuration: {0}")]
    ConfigurationRejected(String),
    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_pixel_count_does_not_overflow() {
        let res = Resolution::new(u32::MAX, 2);
        assert_eq!(res.pixel_count(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn test_frame_rate_range_durations() {
        let range = FrameRateRange::new(15.0, 60.0);
        assert_eq!(range.min_frame_duration(), Duration::from_secs_f64(1.0 / 60.0));
        assert_eq!(range.max_frame_duration(), Duration::from_secs_f64(1.0 / 15.0));
    }

    #[test]
    fn test_zero_rate_has_zero_duration() {
        let range = FrameRateRange::fixed(0.0);
        assert_eq!(range.min_frame_duration(), Duration::ZERO);
    }

    #[test]
    fn test_format_display() {
        let format = Format::new(
            Resolution::new(1280, 720),
            PixelEncoding::Mjpeg,
            vec![FrameRateRange::fixed(30.0), FrameRateRange::new(5.0, 60.0)],
        );
        assert_eq!(format.to_string(), "1280x720 MJPEG @ 30, 5-60 fps");
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(CameraError::NoDevices.to_string(), "No cameras found");
        assert_eq!(
            CameraError::OpenFailed("busy".to_string()).to_string(),
            "Failed to open camera: busy"
        );
        assert!(CameraError::PermissionDenied
            .to_string()
            .contains("permission denied"));
        assert!(CameraError::DeviceNotFound(5).to_string().contains('5'));
    }

    #[test]
    fn test_frame_stride() {
        let frame = Frame {
            data: vec![0; 2 * 3 * 4],
            width: 2,
            height: 3,
            color_space: ColorSpace::Srgb,
            sequence: 0,
            timestamp: Instant::now(),
        };
        assert_eq!(frame.stride(), 8);
        assert_eq!(frame.extent(), Resolution::new(2, 3));
    }

    #[test]
    fn test_short_frame_is_incomplete() {
        let mut frame = Frame {
            data: vec![0; 4 * 4 * 4],
            width: 4,
            height: 4,
            color_space: ColorSpace::Srgb,
            sequence: 0,
            timestamp: Instant::now(),
        };
        assert_eq!(frame.expected_len(), 64);
        assert!(frame.is_complete());

        frame.data.truncate(63);
        assert!(!frame.is_complete());
    }
}
