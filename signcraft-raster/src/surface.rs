//! Offscreen raster surface built on tiny-skia and cosmic-text.
//!
//! The surface carries a base transform so callers draw in design-space
//! coordinates; the export pipeline sets a contain-fit transform and paints
//! background, board, and text without doing its own coordinate math.

use crate::error::{RasterError, RasterResult};
use crate::fonts::FontRegistry;
use crate::gradient::GradientStop;
use crate::source::DecodedImage;
use crate::text::{self, TextFont};
use cosmic_text::{Attrs, Buffer, Command, FontSystem, Metrics, Shaping, SwashCache};
use signcraft_core::{Rect, Size2};
use tiny_skia::{Pixmap, PixmapPaint, PixmapRef, Transform};

/// Maximum surface dimension (same as Chrome's canvas limit).
const MAX_DIMENSION: u32 = 32767;

/// Offscreen drawing surface.
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixmap: Pixmap,
    font_system: FontSystem,
    swash_cache: SwashCache,
    transform: Transform,
}

impl RasterSurface {
    /// Create a surface with the given dimensions, sharing the registry's
    /// font database.
    pub fn new(width: u32, height: u32, registry: &FontRegistry) -> RasterResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RasterError::InvalidDimensions { width, height });
        }
        let pixmap =
            Pixmap::new(width, height).ok_or(RasterError::InvalidDimensions { width, height })?;
        let font_system =
            FontSystem::new_with_locale_and_db("en".to_string(), registry.database().clone());

        Ok(Self {
            width,
            height,
            pixmap,
            font_system,
            swash_cache: SwashCache::new(),
            transform: Transform::identity(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set the base transform applied to all subsequent drawing.
    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn reset_transform(&mut self) {
        self.transform = Transform::identity();
    }

    /// Flood the whole surface, ignoring the base transform.
    pub fn clear(&mut self, color: tiny_skia::Color) {
        self.pixmap.fill(color);
    }

    /// Fill a rectangle with a solid color.
    pub fn fill_rect(&mut self, rect: Rect, color: tiny_skia::Color) {
        log::debug!(target: "surface", "fillRect {} {} {} {}", rect.x, rect.y, rect.width, rect.height);
        let Some(skia_rect) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
        else {
            return;
        };
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(color);
        self.pixmap
            .fill_rect(skia_rect, &paint, self.transform, None);
    }

    /// Fill a rectangle with a vertical linear gradient.
    pub fn fill_rect_gradient(&mut self, rect: Rect, stops: &[GradientStop]) {
        log::debug!(target: "surface", "fillRect gradient {} stops", stops.len());
        if stops.is_empty() {
            return;
        }
        let Some(skia_rect) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
        else {
            return;
        };
        let skia_stops: Vec<tiny_skia::GradientStop> = stops
            .iter()
            .map(|s| tiny_skia::GradientStop::new(s.offset, s.color))
            .collect();
        let Some(shader) = tiny_skia::LinearGradient::new(
            tiny_skia::Point {
                x: rect.x + rect.width / 2.0,
                y: rect.y,
            },
            tiny_skia::Point {
                x: rect.x + rect.width / 2.0,
                y: rect.bottom(),
            },
            skia_stops,
            tiny_skia::SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };
        let paint = tiny_skia::Paint {
            shader,
            anti_alias: true,
            ..Default::default()
        };
        self.pixmap
            .fill_rect(skia_rect, &paint, self.transform, None);
    }

    /// Draw a decoded image scaled into `dest`.
    pub fn draw_image(&mut self, image: &DecodedImage, dest: Rect) {
        log::debug!(target: "surface", "drawImage {}x{} -> {:?}", image.width, image.height, dest);
        let premultiplied = premultiply(&image.data);
        let Some(pixmap) = PixmapRef::from_bytes(&premultiplied, image.width, image.height) else {
            return;
        };
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let paint = PixmapPaint {
            quality: tiny_skia::FilterQuality::Bilinear,
            ..Default::default()
        };
        let transform = self
            .transform
            .pre_translate(dest.x, dest.y)
            .pre_scale(dest.width / image.width as f32, dest.height / image.height as f32);
        self.pixmap.draw_pixmap(0, 0, pixmap, &paint, transform, None);
    }

    /// Draw a cropped region of a decoded image into `dest`.
    pub fn draw_image_cropped(&mut self, image: &DecodedImage, src: Rect, dest: Rect) {
        // Clamp the source rectangle to the image bounds.
        let sx = src.x.max(0.0);
        let sy = src.y.max(0.0);
        let sw = src.width.min(image.width as f32 - sx);
        let sh = src.height.min(image.height as f32 - sy);
        if sw <= 0.0 || sh <= 0.0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }

        let premultiplied = premultiply(&image.data);
        let Some(pixmap) = PixmapRef::from_bytes(&premultiplied, image.width, image.height) else {
            return;
        };

        // Extract the source region into a sub-pixmap, then draw it scaled.
        let sub_width = sw.ceil() as u32;
        let sub_height = sh.ceil() as u32;
        let Some(mut sub_pixmap) = Pixmap::new(sub_width, sub_height) else {
            return;
        };
        let extract_transform = Transform::from_translate(-sx.floor(), -sy.floor());
        sub_pixmap.draw_pixmap(0, 0, pixmap, &PixmapPaint::default(), extract_transform, None);

        let paint = PixmapPaint {
            quality: tiny_skia::FilterQuality::Bilinear,
            ..Default::default()
        };
        let transform = self
            .transform
            .pre_translate(dest.x, dest.y)
            .pre_scale(dest.width / sub_width as f32, dest.height / sub_height as f32);
        self.pixmap
            .draw_pixmap(0, 0, sub_pixmap.as_ref(), &paint, transform, None);
    }

    /// Measure the natural bounding box of text at the given font.
    pub fn measure_text(&mut self, content: &str, font: &TextFont) -> Size2 {
        text::measure_text(&mut self.font_system, content, font)
    }

    /// Fill one line of text centered at `(x, y)` (middle baseline).
    pub fn fill_text(&mut self, content: &str, x: f32, y: f32, font: &TextFont, color: tiny_skia::Color) {
        log::debug!(target: "surface", "fillText {:?} {} {}", content, x, y);
        self.render_text(content, x, y, font, color, None);
    }

    /// Stroke one line of text centered at `(x, y)` (middle baseline).
    pub fn stroke_text(
        &mut self,
        content: &str,
        x: f32,
        y: f32,
        font: &TextFont,
        color: tiny_skia::Color,
        line_width: f32,
    ) {
        log::debug!(target: "surface", "strokeText {:?} {} {}", content, x, y);
        self.render_text(content, x, y, font, color, Some(line_width));
    }

    /// Shared glyph-outline renderer. `stroke` of `None` fills.
    fn render_text(
        &mut self,
        content: &str,
        x: f32,
        y: f32,
        font: &TextFont,
        color: tiny_skia::Color,
        stroke: Option<f32>,
    ) {
        let metrics = Metrics::new(font.size_px, font.size_px * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let attrs = Attrs::new().family(font.primary_family());
        buffer.set_text(&mut self.font_system, content, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(&mut self.font_system, false);

        // Text dimensions for center alignment and middle baseline.
        let mut text_width: f32 = 0.0;
        let mut text_ascent: f32 = 0.0;
        let mut text_descent: f32 = 0.0;
        for run in buffer.layout_runs() {
            text_width = text_width.max(run.line_w);
            text_ascent = text_ascent.max(run.line_y - run.line_top);
            text_descent = text_descent.max((run.line_top + run.line_height) - run.line_y);
        }
        if text_ascent == 0.0 && text_descent == 0.0 {
            text_ascent = font.size_px * 0.8;
            text_descent = font.size_px * 0.2;
        }

        let base_x = x - text_width / 2.0;
        let base_y = y + text_ascent / 2.0 - text_descent / 2.0;

        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            ..Default::default()
        };
        paint.set_color(color);

        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                let physical_glyph = glyph.physical((base_x, base_y), 1.0);

                // Floating-point glyph position for sub-pixel precision.
                let glyph_x = base_x + glyph.x + glyph.font_size * glyph.x_offset;
                let glyph_y = base_y + glyph.y - glyph.font_size * glyph.y_offset;

                if let Some(commands) = self
                    .swash_cache
                    .get_outline_commands(&mut self.font_system, physical_glyph.cache_key)
                {
                    // Font outlines have Y pointing up, the surface has Y
                    // pointing down, so Y is negated while building.
                    let mut path_builder = tiny_skia::PathBuilder::new();
                    for cmd in commands {
                        match cmd {
                            Command::MoveTo(p) => path_builder.move_to(p.x, -p.y),
                            Command::LineTo(p) => path_builder.line_to(p.x, -p.y),
                            Command::QuadTo(ctrl, end) => {
                                path_builder.quad_to(ctrl.x, -ctrl.y, end.x, -end.y)
                            }
                            Command::CurveTo(c1, c2, end) => {
                                path_builder.cubic_to(c1.x, -c1.y, c2.x, -c2.y, end.x, -end.y)
                            }
                            Command::Close => path_builder.close(),
                        }
                    }

                    if let Some(path) = path_builder.finish() {
                        let glyph_transform = Transform::from_translate(glyph_x, glyph_y)
                            .post_concat(self.transform);

                        match stroke {
                            None => {
                                self.pixmap.fill_path(
                                    &path,
                                    &paint,
                                    tiny_skia::FillRule::Winding,
                                    glyph_transform,
                                    None,
                                );
                            }
                            Some(width) => {
                                let stroke = tiny_skia::Stroke {
                                    width,
                                    line_join: tiny_skia::LineJoin::Round,
                                    ..Default::default()
                                };
                                self.pixmap.stroke_path(
                                    &path,
                                    &paint,
                                    &stroke,
                                    glyph_transform,
                                    None,
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    /// Surface contents as straight-alpha RGBA.
    pub fn to_rgba(&self) -> Vec<u8> {
        unpremultiply(self.pixmap.data())
    }

    /// Read one pixel as straight-alpha RGBA. Out-of-bounds reads return
    /// transparent black.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = &self.pixmap.data()[idx..idx + 4];
        let a = px[3];
        if a == 0 {
            [0, 0, 0, 0]
        } else if a == 255 {
            [px[0], px[1], px[2], 255]
        } else {
            let alpha_f = a as f32 / 255.0;
            [
                (px[0] as f32 / alpha_f).min(255.0) as u8,
                (px[1] as f32 / alpha_f).min(255.0) as u8,
                (px[2] as f32 / alpha_f).min(255.0) as u8,
                a,
            ]
        }
    }

    /// Encode the surface as PNG.
    pub fn to_png(&self) -> RasterResult<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.to_rgba())?;
        }
        Ok(buf)
    }
}

/// Straight RGBA to premultiplied, using integer math with rounding.
fn premultiply(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(4) {
        let a = px[3];
        match a {
            255 => out.extend_from_slice(px),
            0 => out.extend_from_slice(&[0, 0, 0, 0]),
            _ => {
                let a16 = a as u16;
                out.push(((px[0] as u16 * a16 + 127) / 255) as u8);
                out.push(((px[1] as u16 * a16 + 127) / 255) as u8);
                out.push(((px[2] as u16 * a16 + 127) / 255) as u8);
                out.push(a);
            }
        }
    }
    out
}

/// Premultiplied RGBA to straight alpha.
fn unpremultiply(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for px in data.chunks_exact(4) {
        let a = px[3];
        match a {
            255 => out.extend_from_slice(px),
            0 => out.extend_from_slice(&[0, 0, 0, 0]),
            _ => {
                let alpha_f = a as f32 / 255.0;
                out.push((px[0] as f32 / alpha_f).min(255.0) as u8);
                out.push((px[1] as f32 / alpha_f).min(255.0) as u8);
                out.push((px[2] as f32 / alpha_f).min(255.0) as u8);
                out.push(a);
            }
        }
    }
    out
}
