//! Camera backend on top of nokhwa.

use std::collections::HashMap;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType, Resolution as NokhwaResolution,
};
use nokhwa::Camera;

use super::backend::{CaptureBackend, FrameStream, Sample};
use super::frame_utils::frame_from_rgb;
use super::types::{
    ActiveConfiguration, CameraError, Device, Format, FrameRateRange, PixelEncoding, Resolution,
};

/// Built-in and external cameras as reported by the platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl CaptureBackend for NativeBackend {
    type Stream = NativeStream;

    fn devices(&self) -> Result<Vec<Device>, CameraError> {
        let infos =
            nokhwa::query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

        let mut devices = Vec::with_capacity(infos.len());
        for info in infos {
            let index = info.index().clone();
            let formats = match read_formats(&index) {
                Ok(formats) => formats,
                Err(e) => {
                    log::warn!("Skipping formats for {}: {}", info.human_name(), e);
                    Vec::new()
                }
            };
            devices.push(Device {
                id: index.to_string(),
                name: info.human_name(),
                formats,
            });
        }
        Ok(devices)
    }

    fn open(&self, config: &ActiveConfiguration) -> Result<NativeStream, CameraError> {
        let index = parse_index(&config.device.id);
        let rate = config
            .frame_durations
            .map(|b| b.target_rate().round() as u32)
            .unwrap_or(30);
        let format = CameraFormat::new(
            NokhwaResolution::new(config.format.resolution.width, config.format.resolution.height),
            to_frame_format(config.format.encoding),
            rate,
        );

        let mut camera = open_with_fallback(&index, format)?;
        camera
            .open_stream()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        Ok(NativeStream { camera })
    }
}

/// An open nokhwa stream. Lives on the capture thread.
pub struct NativeStream {
    camera: Camera,
}

impl FrameStream for NativeStream {
    fn next_sample(&mut self) -> Result<Sample, CameraError> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::StreamFailed(e.to_string()))?;

        let resolution = buffer.resolution();
        let Ok(decoded) = buffer.decode_image::<RgbFormat>() else {
            return Ok(Sample::Dropped);
        };

        Ok(
            match frame_from_rgb(decoded.as_raw(), resolution.width(), resolution.height()) {
                Some(frame) => Sample::Frame(frame),
                None => Sample::Dropped,
            },
        )
    }

    fn close(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::warn!("Failed to stop camera stream: {}", e);
        }
    }
}

/// Whether the platform has already granted camera access.
pub fn access_granted() -> bool {
    nokhwa::nokhwa_check()
}

/// Ask the platform for camera access; `on_complete` runs with the answer.
pub fn request_access(on_complete: impl Fn(bool) + Send + Sync + 'static) {
    nokhwa::nokhwa_initialize(on_complete);
}

/// Open the camera briefly and group its modes into formats.
fn read_formats(index: &CameraIndex) -> Result<Vec<Format>, CameraError> {
    let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::None);
    let mut camera = Camera::new(index.clone(), requested).map_err(|e| classify(e.to_string()))?;
    let modes = camera
        .compatible_camera_formats()
        .map_err(|e| CameraError::QueryFailed(e.to_string()))?;
    Ok(group_modes(
        modes
            .iter()
            .filter_map(|m| {
                let encoding = from_frame_format(m.format())?;
                let res = m.resolution();
                Some((Resolution::new(res.width(), res.height()), encoding, m.frame_rate()))
            })
            .collect(),
    ))
}

/// Open with the exact format, falling back to the closest one the device offers.
fn open_with_fallback(index: &CameraIndex, format: CameraFormat) -> Result<Camera, CameraError> {
    let attempts = [
        RequestedFormatType::Exact(format),
        RequestedFormatType::Closest(format),
    ];

    let mut last_error = None;
    for attempt in attempts {
        match Camera::new(index.clone(), RequestedFormat::new::<RgbFormat>(attempt)) {
            Ok(camera) => {
                if camera.camera_format() != format {
                    log::warn!(
                        "Requested {} not accepted, running at {}",
                        format,
                        camera.camera_format()
                    );
                }
                return Ok(camera);
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(match last_error {
        Some(e) => classify(e.to_string()),
        None => CameraError::OpenFailed(index.to_string()),
    })
}

/// Merge (resolution, encoding, rate) modes into formats, keeping first-seen order.
fn group_modes(modes: Vec<(Resolution, PixelEncoding, u32)>) -> Vec<Format> {
    let mut formats: Vec<Format> = Vec::new();
    let mut positions: HashMap<(Resolution, PixelEncoding), usize> = HashMap::new();

    for (resolution, encoding, rate) in modes {
        let range = FrameRateRange::fixed(f64::from(rate));
        match positions.get(&(resolution, encoding)) {
            Some(&i) => formats[i].frame_rates.push(range),
            None => {
                positions.insert((resolution, encoding), formats.len());
                formats.push(Format::new(resolution, encoding, vec![range]));
            }
        }
    }
    formats
}

fn parse_index(id: &str) -> CameraIndex {
    match id.parse::<u32>() {
        Ok(i) => CameraIndex::Index(i),
        Err(_) => CameraIndex::String(id.to_string()),
    }
}

fn from_frame_format(format: NokhwaFrameFormat) -> Option<PixelEncoding> {
    match format {
        NokhwaFrameFormat::MJPEG => Some(PixelEncoding::Mjpeg),
        NokhwaFrameFormat::YUYV => Some(PixelEncoding::Yuyv),
        NokhwaFrameFormat::NV12 => Some(PixelEncoding::Nv12),
        NokhwaFrameFormat::GRAY => Some(PixelEncoding::Gray),
        NokhwaFrameFormat::RAWRGB => Some(PixelEncoding::Rgb),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

fn to_frame_format(encoding: PixelEncoding) -> NokhwaFrameFormat {
    match encoding {
        PixelEncoding::Mjpeg => NokhwaFrameFormat::MJPEG,
        PixelEncoding::Yuyv => NokhwaFrameFormat::YUYV,
        PixelEncoding::Nv12 => NokhwaFrameFormat::NV12,
        PixelEncoding::Gray => NokhwaFrameFormat::GRAY,
        PixelEncoding::Rgb | PixelEncoding::Rgba => NokhwaFrameFormat::RAWRGB,
    }
}

/// Map an open failure to a permission error when the message says so.
fn classify(message: String) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission")
        || lower.contains("denied")
        || lower.contains("authorization")
    {
        CameraError::PermissionDenied
    } else {
        CameraError::ConfigurationRejected(message)
    }
}
