//! Frame rendering for the live view.
//!
//! The renderer follows a simple pipeline:
//! 1. Receive the newest decoded [`Frame`](crate::camera::Frame)
//! 2. Upload it to a GPU texture
//! 3. Clear the surface to black, then draw the frame into the aspect-fit
//!    rectangle computed by [`layout_frame`]

mod gpu;
mod layout;

pub use gpu::{FrameRenderer, RenderOutcome};
pub use layout::{layout_frame, FrameLayout, InsetAxis, Rect, ViewBounds};

use thiserror::Error;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no GPU adapter available")]
    NoAdapter,

    #[error("failed to initialize renderer: {0}")]
    InitError(String),

    #[error("failed to render frame: {0}")]
    RenderError(String),
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
