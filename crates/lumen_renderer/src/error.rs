//! Error types for scene construction and rendering.

use thiserror::Error;

/// Errors raised when a scene violates its light invariant.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Scene has no shapes")]
    Empty,

    #[error("Light index {index} out of range for {len} shapes")]
    LightOutOfRange { index: usize, len: usize },

    #[error("Designated light (shape {0}) has zero emission")]
    LightNotEmissive(usize),
}

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors raised by the renderers and image output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Output buffer holds {found} floats, expected {expected}")]
    BufferSize { expected: usize, found: usize },

    #[error("Image dimensions must be non-zero")]
    ZeroDimension,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations.
pub type RenderResult<T> = Result<T, RenderError>;
