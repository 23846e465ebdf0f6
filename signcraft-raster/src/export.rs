//! The export pipeline: reproduce the preview composition on an offscreen
//! surface and encode it for the cart.
//!
//! The pipeline is strictly sequential per invocation: fonts are confirmed
//! (or time out) before any text is drawn, and the background is fully
//! painted before the board overlay and text go on top. Every resource
//! failure along the way is fail-open — a missing background image becomes
//! a white fill, missing fonts fall back to sans-serif — so the user always
//! gets an export. The only hard error is a surface/encode failure.

use crate::error::{RasterError, RasterResult};
use crate::fonts::FontRegistry;
use crate::gradient;
use crate::parse_color;
use crate::source::ImageSource;
use crate::surface::RasterSurface;
use crate::text::{TextFont, TextMeasurer};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use signcraft_core::{
    contain_fit, cover_crop, BackgroundSpec, CartSubmission, DesignSnapshot, LayoutState, Rect,
    SignageConfig, Size2,
};
use std::time::Duration;
use tiny_skia::Transform;

/// Stroke drawn under each text fill for legibility on busy backgrounds.
const TEXT_STROKE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.55];

/// Stroke width as a fraction of the font size, with a floor.
const TEXT_STROKE_RATIO: f32 = 0.08;
const TEXT_STROKE_MIN: f32 = 2.0;

/// Export tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Side length of the square export surface.
    pub size: u32,
    /// Longest side allowed in the encoded output; larger results are
    /// downscaled proportionally.
    pub max_side: u32,
    /// JPEG encoding quality (0-100).
    pub jpeg_quality: u8,
    /// Bounded wait for custom fonts before rendering with fallbacks.
    pub font_timeout: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            size: 1200,
            max_side: 1200,
            jpeg_quality: 85,
            font_timeout: Duration::from_secs(10),
        }
    }
}

/// Renders design snapshots into flattened raster exports.
pub struct Exporter {
    registry: FontRegistry,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(registry: FontRegistry) -> Self {
        Self {
            registry,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(registry: FontRegistry, options: ExportOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut FontRegistry {
        &mut self.registry
    }

    /// Run a pending auto-fit measurement for the layout, if one is due.
    /// The preview calls this whenever text, font, or effective font size
    /// changed; manual-resize mode leaves the box alone.
    pub fn auto_fit(&mut self, config: &SignageConfig, layout: &mut LayoutState) {
        if !layout.needs_measure() {
            return;
        }
        let font = TextFont::new(&layout.font_value, layout.effective_font_size(config));
        let text = layout.display_lines().join("\n");
        let measured = TextMeasurer::new(&self.registry).measure(&text, &font);
        layout.apply_auto_fit(config, measured);
    }

    /// Export a snapshot: render, encode as JPEG, wrap as a cart
    /// submission with the signage metadata attached.
    pub fn export(&mut self, snapshot: &DesignSnapshot) -> RasterResult<CartSubmission> {
        let jpeg = self.export_jpeg(snapshot)?;
        log::debug!(target: "export", "encoded {} byte JPEG", jpeg.len());
        Ok(CartSubmission {
            image: format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(&jpeg)),
            signage_data: snapshot.signage_data(),
        })
    }

    /// Render and encode as raw JPEG bytes.
    pub fn export_jpeg(&mut self, snapshot: &DesignSnapshot) -> RasterResult<Vec<u8>> {
        let surface = self.render(snapshot)?;
        encode_jpeg(&surface, self.options.max_side, self.options.jpeg_quality)
    }

    /// Render and encode as raw PNG bytes.
    pub fn export_png(&mut self, snapshot: &DesignSnapshot) -> RasterResult<Vec<u8>> {
        self.render(snapshot)?.to_png()
    }

    /// Render a snapshot onto a fresh export surface without encoding.
    pub fn render(&mut self, snapshot: &DesignSnapshot) -> RasterResult<RasterSurface> {
        // Fonts first; bounded and fail-open.
        let font = TextFont::new(&snapshot.font_family, snapshot.font_size);
        self.registry
            .ensure_ready(&font.families, self.options.font_timeout);

        let size = self.options.size;
        let mut surface = RasterSurface::new(size, size, &self.registry)?;
        surface.clear(tiny_skia::Color::WHITE);

        // Contain the whole design inside the square, centered.
        let out = Size2::new(size as f32, size as f32);
        let fit = contain_fit(snapshot.design, out);
        surface.set_transform(
            Transform::from_translate(fit.offset_x, fit.offset_y).pre_scale(fit.scale, fit.scale),
        );

        let design_rect = Rect::new(0.0, 0.0, snapshot.design.width, snapshot.design.height);
        self.paint_background(&mut surface, snapshot, design_rect);
        self.paint_board(&mut surface, snapshot);
        self.paint_text(&mut surface, snapshot, &font);

        Ok(surface)
    }

    fn paint_background(
        &mut self,
        surface: &mut RasterSurface,
        snapshot: &DesignSnapshot,
        design_rect: Rect,
    ) {
        match &snapshot.background {
            BackgroundSpec::Color { color, gradient } => {
                if let Some(id) = gradient {
                    if let Some(def) = gradient::resolve(id) {
                        surface.fill_rect_gradient(design_rect, &def.stops());
                        return;
                    }
                    log::warn!(target: "export", "unknown gradient {:?}, flat fill", id);
                }
                let fill = parse_color(color).unwrap_or_else(|err| {
                    log::warn!(target: "export", "{}, filling white", err);
                    tiny_skia::Color::WHITE
                });
                surface.fill_rect(design_rect, fill);
            }
            BackgroundSpec::Image { url } => match ImageSource::from_ref(url).load() {
                Ok(image) => {
                    // Cover-crop so the image fills the design rect without
                    // distortion.
                    let crop = cover_crop(image.size(), snapshot.design.aspect());
                    surface.draw_image_cropped(&image, crop, design_rect);
                }
                Err(err) => {
                    log::warn!(target: "export", "background image failed ({}), filling white", err);
                    surface.fill_rect(design_rect, tiny_skia::Color::WHITE);
                }
            },
        }
    }

    fn paint_board(&mut self, surface: &mut RasterSurface, snapshot: &DesignSnapshot) {
        let Some(path) = &snapshot.board_image else {
            return;
        };
        match ImageSource::from_ref(path).load() {
            Ok(image) => surface.draw_image(&image, snapshot.board),
            Err(err) => {
                log::warn!(target: "export", "board overlay failed ({}), skipping", err);
            }
        }
    }

    fn paint_text(&mut self, surface: &mut RasterSurface, snapshot: &DesignSnapshot, font: &TextFont) {
        let fill = parse_color(&snapshot.text_color).unwrap_or_else(|err| {
            log::warn!(target: "export", "{}, using black", err);
            tiny_skia::Color::BLACK
        });
        let [r, g, b, a] = TEXT_STROKE_COLOR;
        let stroke = tiny_skia::Color::from_rgba(r, g, b, a).unwrap_or(tiny_skia::Color::WHITE);
        let stroke_width = (snapshot.font_size * TEXT_STROKE_RATIO).max(TEXT_STROKE_MIN);

        for line in &snapshot.lines {
            surface.stroke_text(
                &line.content,
                line.position.x,
                line.position.y,
                font,
                stroke,
                stroke_width,
            );
            surface.fill_text(&line.content, line.position.x, line.position.y, font, fill);
        }
    }
}

/// Encode a surface as JPEG, downscaling proportionally if its longest
/// side exceeds `max_side`.
fn encode_jpeg(surface: &RasterSurface, max_side: u32, quality: u8) -> RasterResult<Vec<u8>> {
    let (width, height) = (surface.width(), surface.height());
    let rgba = image::RgbaImage::from_raw(width, height, surface.to_rgba())
        .ok_or_else(|| RasterError::JpegError("surface buffer size mismatch".to_string()))?;
    let mut dynamic = image::DynamicImage::ImageRgba8(rgba);

    let longest = width.max(height);
    if longest > max_side {
        let scale = max_side as f32 / longest as f32;
        let new_width = ((width as f32 * scale).round() as u32).max(1);
        let new_height = ((height as f32 * scale).round() as u32).max(1);
        log::debug!(target: "export", "downscaling {}x{} -> {}x{}", width, height, new_width, new_height);
        dynamic = dynamic.resize_exact(
            new_width,
            new_height,
            image::imageops::FilterType::CatmullRom,
        );
    }

    let rgb = dynamic.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| RasterError::JpegError(e.to_string()))?;
    Ok(buf)
}
