//! Capture format and frame-rate selection.

use super::types::{Format, FrameDurationBounds, FrameRateRange};

/// A format must be able to exceed this rate to replace a smaller one.
pub const MIN_PREFERRED_FRAME_RATE: f64 = 29.0;

/// Highest frame rate any of the format's ranges supports, or 0 with no ranges.
pub fn max_frame_rate(format: &Format) -> f64 {
    format
        .frame_rates
        .iter()
        .fold(0.0, |acc, range| acc.max(range.max_rate))
}

/// Pick the capture format for a device.
///
/// Starts from the first format and only moves to a candidate with strictly
/// more pixels whose max frame rate is strictly above
/// [`MIN_PREFERRED_FRAME_RATE`]. Returns `None` only for an empty list.
pub fn select_format(formats: &[Format]) -> Option<&Format> {
    let first = formats.first()?;
    let mut selected = first;
    let mut selected_pixels = first.resolution.pixel_count();

    for format in formats {
        let pixels = format.resolution.pixel_count();
        if pixels > selected_pixels && max_frame_rate(format) > MIN_PREFERRED_FRAME_RATE {
            selected = format;
            selected_pixels = pixels;
        }
    }

    Some(selected)
}

/// Pick the frame-rate range with the largest max rate.
///
/// Ranges are sorted ascending by max rate (stable) and the last one wins,
/// so among equal max rates the last listed range is chosen.
pub fn select_frame_rate_range(format: &Format) -> Option<FrameRateRange> {
    let mut ranges = format.frame_rates.clone();
    ranges.sort_by(|a, b| a.max_rate.total_cmp(&b.max_rate));
    ranges.last().copied()
}

/// Frame-duration bounds derived from the best range of `format`.
pub fn frame_duration_bounds(format: &Format) -> Option<FrameDurationBounds> {
    select_frame_rate_range(format).map(|range| FrameDurationBounds {
        min: range.min_frame_duration(),
        max: range.max_frame_duration(),
    })
}
