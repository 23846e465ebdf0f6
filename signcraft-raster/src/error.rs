//! Error types for signcraft-raster.

use thiserror::Error;

/// Result type alias using RasterError.
pub type RasterResult<T> = Result<T, RasterError>;

/// Errors that can occur while rasterizing a signage design.
#[derive(Debug, Error)]
pub enum RasterError {
    /// Invalid surface dimensions (must be positive and within limits).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Failed to parse a color value.
    #[error("Failed to parse color: {0}")]
    ColorParseError(String),

    /// Failed to load or decode an image source.
    #[error("Image error: {0}")]
    ImageError(String),

    /// Failed to load a font source.
    #[error("Font error: {0}")]
    FontError(String),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngError(String),

    /// JPEG encoding error.
    #[error("JPEG encoding error: {0}")]
    JpegError(String),
}

impl From<png::EncodingError> for RasterError {
    fn from(err: png::EncodingError) -> Self {
        RasterError::PngError(err.to_string())
    }
}
