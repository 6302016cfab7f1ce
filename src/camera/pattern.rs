//! Synthetic test-pattern camera.
//!
//! Always available, so the viewer runs on machines without a camera and
//! the capture controller can be exercised without hardware.

use std::thread;
use std::time::{Duration, Instant};

use super::backend::{CaptureBackend, FrameStream, Sample};
use super::types::{
    ActiveConfiguration, CameraError, ColorSpace, Device, Format, Frame, FrameRateRange,
    PixelEncoding, Resolution,
};

const BARS: [[u8; 3]; 8] = [
    [0xc0, 0xc0, 0xc0],
    [0xc0, 0xc0, 0x00],
    [0x00, 0xc0, 0xc0],
    [0x00, 0xc0, 0x00],
    [0xc0, 0x00, 0xc0],
    [0xc0, 0x00, 0x00],
    [0x00, 0x00, 0xc0],
    [0x10, 0x10, 0x10],
];

/// What a pattern device draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Vertical color bars with a sweeping white line
    ColorBars,
    /// Horizontal gray ramp that scrolls over time
    Gradient,
}

/// Backend producing generated frames.
#[derive(Debug, Clone)]
pub struct PatternBackend {
    devices: Vec<(Device, Pattern)>,
}

impl Default for PatternBackend {
    fn default() -> Self {
        let formats = vec![
            Format::new(
                Resolution::new(640, 480),
                PixelEncoding::Rgba,
                vec![FrameRateRange::new(5.0, 30.0), FrameRateRange::new(5.0, 60.0)],
            ),
            Format::new(
                Resolution::new(1280, 720),
                PixelEncoding::Rgba,
                vec![FrameRateRange::new(1.0, 30.0)],
            ),
            Format::new(
                Resolution::new(1920, 1080),
                PixelEncoding::Rgba,
                vec![FrameRateRange::new(1.0, 15.0)],
            ),
        ];

        Self::new(vec![
            (
                Device {
                    id: "pattern:bars".to_string(),
                    name: "Test Pattern (color bars)".to_string(),
                    formats: formats.clone(),
                },
                Pattern::ColorBars,
            ),
            (
                Device {
                    id: "pattern:gradient".to_string(),
                    name: "Test Pattern (gradient)".to_string(),
                    formats,
                },
                Pattern::Gradient,
            ),
        ])
    }
}

impl PatternBackend {
    pub fn new(devices: Vec<(Device, Pattern)>) -> Self {
        Self { devices }
    }
}

impl CaptureBackend for PatternBackend {
    type Stream = PatternStream;

    fn devices(&self) -> Result<Vec<Device>, CameraError> {
        Ok(self.devices.iter().map(|(d, _)| d.clone()).collect())
    }

    fn open(&self, config: &ActiveConfiguration) -> Result<PatternStream, CameraError> {
        let pattern = self
            .devices
            .iter()
            .find(|(d, _)| d.id == config.device.id)
            .map(|(_, p)| *p)
            .ok_or_else(|| CameraError::OpenFailed(format!("no such device: {}", config.device.id)))?;

        let interval = config
            .frame_durations
            .map(|b| b.min)
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(33));

        Ok(PatternStream {
            pattern,
            resolution: config.format.resolution,
            interval,
            next_due: Instant::now(),
            tick: 0,
        })
    }
}

/// A running pattern stream, paced at the configured minimum frame duration.
#[derive(Debug)]
pub struct PatternStream {
    pattern: Pattern,
    resolution: Resolution,
    interval: Duration,
    next_due: Instant,
    tick: u64,
}

impl FrameStream for PatternStream {
    fn next_sample(&mut self) -> Result<Sample, CameraError> {
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
        }
        self.next_due += self.interval;

        let data = render_pattern(self.pattern, self.resolution, self.tick);
        self.tick += 1;

        Ok(Sample::Frame(Frame {
            data,
            width: self.resolution.width,
            height: self.resolution.height,
            color_space: ColorSpace::Srgb,
            sequence: 0,
            timestamp: Instant::now(),
        }))
    }

    fn close(&mut self) {
        log::debug!("Pattern stream closed after {} frames", self.tick);
    }
}

/// Draw one RGBA frame of `pattern` at animation step `tick`.
pub fn render_pattern(pattern: Pattern, resolution: Resolution, tick: u64) -> Vec<u8> {
    let width = resolution.width as usize;
    let height = resolution.height as usize;
    let mut data = vec![0u8; width * height * Frame::BYTES_PER_PIXEL];
    if width == 0 || height == 0 {
        return data;
    }

    let sweep = (tick as usize * 4) % width;
    for (y, row) in data.chunks_exact_mut(width * Frame::BYTES_PER_PIXEL).enumerate() {
        for (x, px) in row.chunks_exact_mut(Frame::BYTES_PER_PIXEL).enumerate() {
            let rgb = match pattern {
                Pattern::ColorBars if x == sweep => [0xff, 0xff, 0xff],
                Pattern::ColorBars => BARS[x * BARS.len() / width],
                Pattern::Gradient => {
                    let v = (((x + tick as usize * 2) % width) * 255 / width) as u8;
                    let shade = if y * 8 / height % 2 == 0 { v } else { 255 - v };
                    [shade, shade, shade]
                }
            };
            px.copy_from_slice(&[rgb[0], rgb[1], rgb[2], 0xff]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::format::select_format;

    #[test]
    fn test_default_devices() {
        let backend = PatternBackend::default();
        let devices = backend.devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "pattern:bars");
    }

    #[test]
    fn test_default_formats_select_720p() {
        // 1080p only reaches 15 fps, so 720p at 30 fps wins.
        let backend = PatternBackend::default();
        let devices = backend.devices().unwrap();
        let selected = select_format(&devices[0].formats).unwrap();
        assert_eq!(selected.resolution, Resolution::new(1280, 720));
    }

    #[test]
    fn test_render_pattern_size_and_alpha() {
        let data = render_pattern(Pattern::ColorBars, Resolution::new(16, 4), 0);
        assert_eq!(data.len(), 16 * 4 * 4);
        assert!(data.chunks_exact(4).all(|px| px[3] == 0xff));
    }

    #[test]
    fn test_color_bars_sweep_moves() {
        let res = Resolution::new(64, 2);
        assert_ne!(
            render_pattern(Pattern::ColorBars, res, 0),
            render_pattern(Pattern::ColorBars, res, 1)
        );
    }

    #[test]
    fn test_render_pattern_empty_resolution() {
        assert!(render_pattern(Pattern::Gradient, Resolution::new(0, 10), 3).is_empty());
    }
}
