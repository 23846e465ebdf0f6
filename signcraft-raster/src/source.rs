//! Image source loading for backgrounds and board overlays.
//!
//! Sources come in as opaque strings from the layout (uploaded data URLs,
//! backend-hosted paths, absolute URLs). Decoding always yields straight
//! (non-premultiplied) RGBA; the surface premultiplies when drawing.

use crate::error::{RasterError, RasterResult};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use signcraft_core::{net, Size2};
use std::path::PathBuf;
use std::time::Duration;

/// How long a single remote image fetch may take.
const IMAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Decoded RGBA pixel data (straight alpha, 4 bytes per pixel).
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedImage {
    pub fn size(&self) -> Size2 {
        Size2::new(self.width as f32, self.height as f32)
    }
}

/// An image reference as stored in the layout.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Bytes(Vec<u8>),
    File(PathBuf),
    Url(String),
    DataUrl(String),
}

impl ImageSource {
    /// Classify an opaque reference string from the layout.
    pub fn from_ref(s: &str) -> Self {
        if s.starts_with("data:") {
            ImageSource::DataUrl(s.to_string())
        } else if s.starts_with("http://") || s.starts_with("https://") {
            ImageSource::Url(s.to_string())
        } else {
            ImageSource::File(PathBuf::from(s))
        }
    }

    /// Load and decode the image to straight RGBA.
    pub fn load(&self) -> RasterResult<DecodedImage> {
        let bytes = match self {
            ImageSource::Bytes(bytes) => bytes.clone(),
            ImageSource::File(path) => std::fs::read(path)
                .map_err(|e| RasterError::ImageError(format!("{}: {}", path.display(), e)))?,
            ImageSource::Url(url) => net::fetch_bytes(url, IMAGE_FETCH_TIMEOUT)
                .map_err(|e| RasterError::ImageError(e.to_string()))?,
            ImageSource::DataUrl(url) => decode_data_url(url)?,
        };
        decode_image(&bytes)
    }
}

/// Decode raster image bytes (PNG, JPEG) into RGBA pixel data.
pub fn decode_image(bytes: &[u8]) -> RasterResult<DecodedImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| RasterError::ImageError(format!("Failed to decode image: {}", e)))?;

    let width = img.width();
    let height = img.height();
    let rgba = img.to_rgba8();

    Ok(DecodedImage {
        data: rgba.into_raw(),
        width,
        height,
    })
}

/// Extract the payload bytes from a `data:<mime>;base64,<payload>` URL.
fn decode_data_url(url: &str) -> RasterResult<Vec<u8>> {
    let comma = url
        .find(',')
        .ok_or_else(|| RasterError::ImageError("malformed data URL".to_string()))?;
    let (header, payload) = url.split_at(comma);
    if !header.ends_with(";base64") {
        return Err(RasterError::ImageError(
            "only base64 data URLs are supported".to_string(),
        ));
    }
    BASE64_STANDARD
        .decode(&payload[1..])
        .map_err(|e| RasterError::ImageError(format!("data URL decode: {}", e)))
}
