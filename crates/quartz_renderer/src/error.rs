//! Errors raised while tracing paths and rendering images.

use quartz_core::GeometryError;
use thiserror::Error;

/// Errors that end a single path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// A hit position, normal or accumulated color was NaN or infinite.
    /// `surface` is the scene index of the last surface involved, if any.
    #[error("Degenerate geometry near surface {surface:?}")]
    DegenerateGeometry { surface: Option<usize> },

    #[error("Surface {surface} has no interaction at the hit point")]
    MissingInteraction { surface: usize },

    #[error("Trace cancelled")]
    Cancelled,
}

/// Errors that end a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid render config: {0}")]
    InvalidConfig(String),

    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    #[error("Trace failed: {0}")]
    Trace(#[from] TraceError),

    #[error("Render cancelled")]
    Cancelled,

    #[error("No valid samples for pixel ({x}, {y})")]
    NoValidSamples { x: u32, y: u32 },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
}

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;
