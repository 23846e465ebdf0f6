//! Text measurement helpers built on cosmic-text.
//!
//! The catalog stores each font as a CSS-style family list token (e.g.
//! `'Dancing Script', cursive`); [`parse_families`] splits it into the
//! ordered preference list used for shaping.

use crate::fonts::FontRegistry;
use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use signcraft_core::layout::LINE_HEIGHT_FACTOR;
use signcraft_core::Size2;

/// A resolved font request: ordered family preferences plus a pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFont {
    pub families: Vec<String>,
    pub size_px: f32,
}

impl TextFont {
    pub fn new(family_token: &str, size_px: f32) -> Self {
        Self {
            families: parse_families(family_token),
            size_px,
        }
    }

    /// The cosmic-text family for the first preference, mapping the generic
    /// CSS names onto their cosmic-text equivalents.
    pub fn primary_family(&self) -> Family<'_> {
        match self.families.first().map(String::as_str) {
            Some("sans-serif") | None => Family::SansSerif,
            Some("serif") => Family::Serif,
            Some("monospace") => Family::Monospace,
            Some("cursive") => Family::Cursive,
            Some("fantasy") => Family::Fantasy,
            Some(name) => Family::Name(name),
        }
    }
}

/// Parse a CSS-style font family list into individual family names,
/// stripping quotes and whitespace.
pub fn parse_families(token: &str) -> Vec<String> {
    let mut families = Vec::new();
    for part in token.split(',') {
        let name = part.trim().trim_matches(|c| c == '\'' || c == '"').trim();
        if !name.is_empty() {
            families.push(name.to_string());
        }
    }
    if families.is_empty() {
        families.push("sans-serif".to_string());
    }
    families
}

/// Measures text without a drawing surface (used for auto-fit sizing).
pub struct TextMeasurer {
    font_system: FontSystem,
}

impl TextMeasurer {
    pub fn new(registry: &FontRegistry) -> Self {
        Self {
            font_system: FontSystem::new_with_locale_and_db(
                "en".to_string(),
                registry.database().clone(),
            ),
        }
    }

    /// Natural rendered size of (possibly multi-line) text.
    pub fn measure(&mut self, text: &str, font: &TextFont) -> Size2 {
        measure_text(&mut self.font_system, text, font)
    }
}

/// Measure the natural bounding box of `text` at the requested font.
///
/// Width is the widest layout run; height covers all runs. When shaping
/// produces no runs (no usable fonts), fall back to line-count metrics so
/// auto-fit still yields a sane box.
pub fn measure_text(font_system: &mut FontSystem, text: &str, font: &TextFont) -> Size2 {
    let line_height = font.size_px * LINE_HEIGHT_FACTOR;
    let metrics = Metrics::new(font.size_px, line_height);
    let mut buffer = Buffer::new(font_system, metrics);

    let attrs = Attrs::new().family(font.primary_family());
    buffer.set_text(font_system, text, &attrs, Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);

    let mut width: f32 = 0.0;
    let mut bottom: f32 = 0.0;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        bottom = bottom.max(run.line_top + run.line_height);
    }

    if width == 0.0 || bottom == 0.0 {
        let line_count = text.lines().count().max(1) as f32;
        return Size2::new(width, line_height * line_count);
    }
    Size2::new(width, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_families_quotes_and_order() {
        assert_eq!(
            parse_families("'Dancing Script', cursive"),
            vec!["Dancing Script", "cursive"]
        );
        assert_eq!(
            parse_families("\"Playfair Display\", serif"),
            vec!["Playfair Display", "serif"]
        );
        assert_eq!(parse_families("Arial"), vec!["Arial"]);
        assert_eq!(parse_families(""), vec!["sans-serif"]);
        assert_eq!(parse_families("  , , "), vec!["sans-serif"]);
    }

    #[test]
    fn test_primary_family_generic_mapping() {
        assert!(matches!(
            TextFont::new("sans-serif", 12.0).primary_family(),
            Family::SansSerif
        ));
        assert!(matches!(
            TextFont::new("'Oswald', sans-serif", 12.0).primary_family(),
            Family::Name("Oswald")
        ));
        assert!(matches!(
            TextFont::new("cursive", 12.0).primary_family(),
            Family::Cursive
        ));
    }

    #[test]
    fn test_measure_empty_font_db_falls_back_to_line_metrics() {
        let registry = FontRegistry::empty();
        let mut measurer = TextMeasurer::new(&registry);
        let font = TextFont::new("'Nope', sans-serif", 40.0);
        let size = measurer.measure("One\nTwo\nThree", &font);
        // No faces: height still reflects the line count.
        assert!((size.height - 40.0 * LINE_HEIGHT_FACTOR * 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let registry = FontRegistry::with_system_fonts();
        if !registry.has_any_face() {
            // Host has no fonts; nothing to compare.
            return;
        }
        let mut measurer = TextMeasurer::new(&registry);
        let small = measurer.measure("Hello", &TextFont::new("sans-serif", 20.0));
        let large = measurer.measure("Hello", &TextFont::new("sans-serif", 60.0));
        assert!(large.width > small.width);
        assert!(large.height > small.height);
    }
}
