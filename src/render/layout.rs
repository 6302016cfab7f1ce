//! Aspect-fit placement of a frame inside the view.

use crate::camera::Resolution;

/// An axis-aligned rectangle in device pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink by `dx` on the left and right and `dy` on the top and bottom.
    pub fn inset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.x + dx,
            self.y + dy,
            self.width - 2.0 * dx,
            self.height - 2.0 * dy,
        )
    }

    /// Intersect with `[0, width] x [0, height]`.
    pub fn clamped_to(&self, width: f64, height: f64) -> Rect {
        let x0 = self.x.clamp(0.0, width);
        let y0 = self.y.clamp(0.0, height);
        let x1 = (self.x + self.width).clamp(0.0, width);
        let y1 = (self.y + self.height).clamp(0.0, height);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// The view's size in logical points and its backing scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub width: f64,
    pub height: f64,
    pub scale_factor: f64,
}

impl ViewBounds {
    pub fn new(width: f64, height: f64, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// The view in device pixels.
    pub fn in_pixels(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.width * self.scale_factor,
            self.height * self.scale_factor,
        )
    }
}

/// Which pair of edges receives the black margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsetAxis {
    /// Margins left and right (pillarbox)
    Horizontal,
    /// Margins top and bottom (letterbox)
    Vertical,
}

/// Where one frame lands in the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Uniform scale applied to the frame: `min(scale_x, scale_y)`
    pub scale: f64,
    pub axis: InsetAxis,
    /// Area cleared to black before the frame is drawn
    pub background: Rect,
    /// Area the scaled frame is drawn into
    pub target: Rect,
}

/// Fit `frame` inside `view` preserving aspect ratio, centered.
///
/// Equal scale factors take the vertical branch, which yields a zero inset.
/// Returns `None` when either size is empty.
pub fn layout_frame(frame: Resolution, view: ViewBounds) -> Option<FrameLayout> {
    let bounds = view.in_pixels();
    if frame.width == 0 || frame.height == 0 || bounds.is_empty() {
        return None;
    }

    let scale_x = bounds.width / f64::from(frame.width);
    let scale_y = bounds.height / f64::from(frame.height);
    let scale = scale_x.min(scale_y);

    let scaled_width = f64::from(frame.width) * scale;
    let scaled_height = f64::from(frame.height) * scale;

    let (axis, target) = if scale_x > scale_y {
        let dx = (bounds.width - scaled_width) / 2.0;
        (InsetAxis::Horizontal, bounds.inset_by(dx, 0.0))
    } else {
        let dy = (bounds.height - scaled_height) / 2.0;
        (InsetAxis::Vertical, bounds.inset_by(0.0, dy))
    };

    Some(FrameLayout {
        scale_x,
        scale_y,
        scale,
        axis,
        background: bounds,
        target,
    })
}
