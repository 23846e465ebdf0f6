//! Offscreen rasterizer for the signcraft signage composer.
//!
//! Reproduces the interactive preview's composition on a raster surface
//! without a browser: background (solid color, gradient, or cover-cropped
//! image), board overlay, and stroked-plus-filled text, encoded as a JPEG
//! data URL for the cart. Built on:
//! - `tiny-skia` for 2D rendering,
//! - `cosmic-text` for text shaping and glyph outlines,
//! - `fontdb` for font database management,
//! - `image` for decoding arbitrary raster inputs and JPEG encoding.

mod error;
mod export;
mod fonts;
pub mod gradient;
mod source;
mod surface;
mod text;

// Re-export public API
pub use error::{RasterError, RasterResult};
pub use export::{ExportOptions, Exporter};
pub use fonts::{FontRegistry, FontSource};
pub use source::{decode_image, DecodedImage, ImageSource};
pub use surface::RasterSurface;
pub use text::{parse_families, TextFont, TextMeasurer};

/// Parse a CSS color string into a tiny_skia::Color.
pub(crate) fn parse_color(s: &str) -> RasterResult<tiny_skia::Color> {
    let parsed = csscolorparser::parse(s)
        .map_err(|e| RasterError::ColorParseError(format!("{}: {}", s, e)))?;

    let [r, g, b, a] = parsed.to_array();
    Ok(tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::BLACK))
}
