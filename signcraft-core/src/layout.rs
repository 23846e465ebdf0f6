//! The live layout model of an editing session.
//!
//! [`LayoutState`] owns every user-editable value (text, style selections,
//! box position/size, background) and the derived values the renderer and
//! rasterizer consume. Font sizing runs as a two-state machine
//! ([`ScaleMode`]): while auto-fitting, the preset font size scales with the
//! user slider; after the first manual resize, font size follows the box
//! height ratio instead, until a text/font/preset change re-arms auto-fit.

use crate::config::{SignageConfig, SizeKey};
use crate::geometry::{board_bounds, Rect, Size2, Vec2};

/// Minimum text box dimensions in design pixels.
pub const MIN_TEXT_BOX: Size2 = Size2::new(48.0, 28.0);

/// Padding added around the measured text during auto-fit.
pub const AUTO_FIT_PADDING_X: f32 = 12.0;
pub const AUTO_FIT_PADDING_Y: f32 = 8.0;

/// Range of the user-driven font scale slider.
pub const USER_SCALE_MIN: f32 = 0.5;
pub const USER_SCALE_MAX: f32 = 2.0;

/// Placeholder line shown (and exported) when the text content is empty.
pub const PLACEHOLDER_TEXT: &str = "Hello";

/// Line height multiplier applied to the font size when stacking lines.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Which mechanism currently governs the font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleMode {
    /// Box tracks the measured text; font size = preset x factor x slider.
    AutoFit,
    /// The user resized the box; font size follows the box height ratio.
    ManualResize,
}

/// Background fill selection. Old values are retained when switching kinds
/// so the user can toggle back without losing their selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    Color,
    Image,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundState {
    pub kind: BackgroundKind,
    /// Base fill color (CSS color string).
    pub color: String,
    /// Selected gradient identifier, if any.
    pub gradient: Option<String>,
    /// Uploaded/selected background image, if any.
    pub image_url: Option<String>,
}

impl Default for BackgroundState {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Color,
            color: "#ffffff".to_string(),
            gradient: None,
            image_url: None,
        }
    }
}

/// Mutable state of one signage editing session.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutState {
    /// Raw multi-line text content.
    pub text_content: String,
    /// Selected font identifier token (from the catalog).
    pub font_value: String,
    /// Selected text color (CSS color string).
    pub text_color: String,
    /// Selected size preset key.
    pub size_key: SizeKey,
    /// Background selection.
    pub background: BackgroundState,
    /// Selected board overlay asset path.
    pub board_image: String,

    position: Vec2,
    box_size: Size2,
    user_scale: f32,
    scale_mode: ScaleMode,
    /// Height established by the last auto-fit measurement (H0).
    auto_baseline_height: f32,
    needs_measure: bool,
}

impl LayoutState {
    /// Create a layout with catalog defaults: medium preset, first font and
    /// color, box centered on the board.
    pub fn new(config: &SignageConfig) -> Self {
        let size_key = SizeKey::Medium;
        let factor = config.text_scale_factor();
        let preset = config.preset(size_key);
        let box_size = Size2::new(preset.width * factor, preset.height * factor);
        let bounds = board_bounds(config.canvas_size());

        let mut layout = Self {
            text_content: String::new(),
            font_value: config.default_font().value.clone(),
            text_color: config
                .text_colors
                .first()
                .cloned()
                .unwrap_or_else(|| "#ffffff".to_string()),
            size_key,
            background: BackgroundState::default(),
            board_image: crate::config::BOARD_IMAGES[0].to_string(),
            position: bounds.center(),
            box_size,
            user_scale: 1.0,
            scale_mode: ScaleMode::AutoFit,
            auto_baseline_height: box_size.height,
            needs_measure: true,
        };
        layout.clamp_to_board(config);
        layout
    }

    // --- Accessors ---

    /// Center of the text box in design space.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current text box dimensions in design space. This is also the
    /// effective size used for clamping and hit-testing.
    pub fn box_size(&self) -> Size2 {
        self.box_size
    }

    pub fn user_scale(&self) -> f32 {
        self.user_scale
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.scale_mode
    }

    /// Whether the renderer should re-measure the text and call
    /// [`apply_auto_fit`](Self::apply_auto_fit).
    pub fn needs_measure(&self) -> bool {
        self.needs_measure
    }

    /// The text box as a rectangle in design space.
    pub fn text_rect(&self) -> Rect {
        Rect::new(
            self.position.x - self.box_size.width / 2.0,
            self.position.y - self.box_size.height / 2.0,
            self.box_size.width,
            self.box_size.height,
        )
    }

    /// Board bounds for the session's canvas.
    pub fn bounds(&self, config: &SignageConfig) -> Rect {
        board_bounds(config.canvas_size())
    }

    /// Lines to render: the content split on newlines, or the placeholder
    /// when empty, so preview and export never diverge on empty input.
    pub fn display_lines(&self) -> Vec<&str> {
        let lines: Vec<&str> = self
            .text_content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .collect();
        if lines.is_empty() {
            vec![PLACEHOLDER_TEXT]
        } else {
            lines
        }
    }

    // --- Derived values ---

    /// The font size the renderer draws with.
    ///
    /// AutoFit: `preset.font_size x text_scale_factor x user_scale`.
    /// ManualResize: `preset.font_size x text_scale_factor x (h / H0)` where
    /// H0 is the last auto-measured height — the box is the scaling handle.
    pub fn effective_font_size(&self, config: &SignageConfig) -> f32 {
        let preset = config.preset(self.size_key);
        let base = preset.font_size * config.text_scale_factor();
        match self.scale_mode {
            ScaleMode::AutoFit => base * self.user_scale,
            ScaleMode::ManualResize => {
                if self.auto_baseline_height > 0.0 {
                    base * (self.box_size.height / self.auto_baseline_height)
                } else {
                    base
                }
            }
        }
    }

    /// Informational physical size of the text box, in inches.
    pub fn size_in_inches(&self, config: &SignageConfig) -> Size2 {
        Size2::new(
            self.box_size.width * config.width_ft * 12.0 / config.canvas_width(),
            self.box_size.height * config.height_ft * 12.0 / config.canvas_height(),
        )
    }

    /// Price of the current size selection.
    pub fn current_price(&self, config: &SignageConfig) -> f64 {
        config.price(self.size_key)
    }

    // --- Mutations ---

    /// Replace the text content. Re-arms auto-fit (ManualResize -> AutoFit).
    pub fn set_text(&mut self, text: &str) {
        if self.text_content != text {
            self.text_content = text.to_string();
            self.rearm_auto_fit();
        }
    }

    /// Select a font by identifier; unknown identifiers fall back to the
    /// catalog default. Re-arms auto-fit.
    pub fn set_font(&mut self, config: &SignageConfig, value: &str) {
        let resolved = if config.has_font(value) {
            value.to_string()
        } else {
            log::warn!(target: "layout", "unknown font {:?}, using default", value);
            config.default_font().value.clone()
        };
        if self.font_value != resolved {
            self.font_value = resolved;
            self.rearm_auto_fit();
        }
    }

    pub fn set_text_color(&mut self, color: &str) {
        self.text_color = color.to_string();
    }

    /// Select a size preset. Re-arms auto-fit and resets the box to the
    /// preset dimensions.
    pub fn set_size_key(&mut self, config: &SignageConfig, key: SizeKey) {
        self.size_key = key;
        let factor = config.text_scale_factor();
        let preset = config.preset(key);
        self.box_size = Size2::new(preset.width * factor, preset.height * factor);
        self.auto_baseline_height = self.box_size.height;
        self.rearm_auto_fit();
        self.clamp_to_board(config);
    }

    /// Adjust the slider scale; clamped to its range. Only meaningful while
    /// auto-fitting (a manual resize takes over as the scaling handle).
    pub fn set_user_scale(&mut self, scale: f32) {
        self.user_scale = scale.clamp(USER_SCALE_MIN, USER_SCALE_MAX);
        if self.scale_mode == ScaleMode::AutoFit {
            // Effective font size changed: the box must be re-measured.
            self.needs_measure = true;
        }
    }

    /// Move the box center, clamped so the box stays inside the board.
    pub fn set_position(&mut self, config: &SignageConfig, position: Vec2) {
        self.position = self.bounds(config).clamp_center(position, self.box_size);
    }

    /// Apply a fresh auto-fit measurement (the text's natural rendered size,
    /// before padding). No-op while the user is in manual-resize mode.
    pub fn apply_auto_fit(&mut self, config: &SignageConfig, measured: Size2) {
        if self.scale_mode != ScaleMode::AutoFit {
            return;
        }
        let bounds = self.bounds(config);
        self.box_size = Size2::new(
            (measured.width + AUTO_FIT_PADDING_X * 2.0)
                .max(MIN_TEXT_BOX.width)
                .min(bounds.width),
            (measured.height + AUTO_FIT_PADDING_Y * 2.0)
                .max(MIN_TEXT_BOX.height)
                .min(bounds.height),
        );
        self.auto_baseline_height = self.box_size.height;
        self.needs_measure = false;
        self.clamp_to_board(config);
    }

    /// Enter manual-resize mode: from now on the box height governs the
    /// font size, until a text/font/preset change re-arms auto-fit.
    pub fn begin_manual_resize(&mut self) {
        if self.scale_mode != ScaleMode::ManualResize {
            log::debug!(target: "layout", "scale mode -> ManualResize (baseline {})",
                self.auto_baseline_height);
            self.scale_mode = ScaleMode::ManualResize;
        }
    }

    /// Resize step: `anchor` is the fixed top-left corner, `proposed` the
    /// raw size from the cursor. The size is clamped to the minimum and to
    /// the board space remaining from the anchor; the center is recomputed
    /// as anchor + half size.
    pub fn resize_from_anchor(&mut self, config: &SignageConfig, anchor: Vec2, proposed: Size2) {
        self.begin_manual_resize();
        let bounds = self.bounds(config);
        let width = proposed
            .width
            .max(MIN_TEXT_BOX.width)
            .min(bounds.right() - anchor.x);
        let height = proposed
            .height
            .max(MIN_TEXT_BOX.height)
            .min(bounds.bottom() - anchor.y);
        self.box_size = Size2::new(width, height);
        self.position = Vec2::new(anchor.x + width / 2.0, anchor.y + height / 2.0);
        self.clamp_to_board(config);
    }

    /// Restore a box directly (resuming a saved design). Enters
    /// manual-resize mode since the saved box is authoritative.
    pub fn restore_box(&mut self, config: &SignageConfig, center: Vec2, size: Size2) {
        let bounds = self.bounds(config);
        self.box_size = Size2::new(
            size.width.max(MIN_TEXT_BOX.width).min(bounds.width),
            size.height.max(MIN_TEXT_BOX.height).min(bounds.height),
        );
        if self.auto_baseline_height <= 0.0 {
            self.auto_baseline_height = self.box_size.height;
        }
        self.scale_mode = ScaleMode::ManualResize;
        self.needs_measure = false;
        self.position = bounds.clamp_center(center, self.box_size);
    }

    fn rearm_auto_fit(&mut self) {
        self.scale_mode = ScaleMode::AutoFit;
        self.needs_measure = true;
    }

    fn clamp_to_board(&mut self, config: &SignageConfig) {
        let bounds = self.bounds(config);
        self.box_size = Size2::new(
            self.box_size.width.min(bounds.width).max(MIN_TEXT_BOX.width),
            self.box_size
                .height
                .min(bounds.height)
                .max(MIN_TEXT_BOX.height),
        );
        self.position = bounds.clamp_center(self.position, self.box_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignageConfig;

    fn config() -> SignageConfig {
        SignageConfig::default()
    }

    #[test]
    fn test_new_layout_defaults() {
        let config = config();
        let layout = LayoutState::new(&config);
        assert_eq!(layout.size_key, SizeKey::Medium);
        assert_eq!(layout.user_scale(), 1.0);
        assert_eq!(layout.scale_mode(), ScaleMode::AutoFit);
        // Medium preset at factor 1.0.
        assert_eq!(layout.box_size(), Size2::new(250.0, 60.0));
        // Box starts fully inside the board.
        let bounds = layout.bounds(&config);
        assert!(bounds.contains_rect(&layout.text_rect()));
    }

    #[test]
    fn test_display_lines_placeholder() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        assert_eq!(layout.display_lines(), vec![PLACEHOLDER_TEXT]);
        layout.set_text("Happy\nBirthday");
        assert_eq!(layout.display_lines(), vec!["Happy", "Birthday"]);
        layout.set_text("   \n  ");
        assert_eq!(layout.display_lines(), vec![PLACEHOLDER_TEXT]);
    }

    #[test]
    fn test_effective_font_size_auto_fit() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        // preset 48 x factor 1.0 x scale 1.0
        assert_eq!(layout.effective_font_size(&config), 48.0);
        layout.set_user_scale(1.5);
        assert_eq!(layout.effective_font_size(&config), 72.0);
        // Slider clamps to its range.
        layout.set_user_scale(5.0);
        assert_eq!(layout.effective_font_size(&config), 48.0 * USER_SCALE_MAX);
        layout.set_user_scale(0.1);
        assert_eq!(layout.effective_font_size(&config), 48.0 * USER_SCALE_MIN);
    }

    #[test]
    fn test_font_size_mode_switching() {
        let config = config();
        let mut layout = LayoutState::new(&config);

        // Establish the auto-fit baseline H0.
        layout.apply_auto_fit(&config, Size2::new(200.0, 52.0));
        let h0 = layout.box_size().height;
        assert_eq!(h0, 52.0 + AUTO_FIT_PADDING_Y * 2.0);

        // Slider governs while auto-fitting.
        layout.set_user_scale(1.25);
        assert_eq!(layout.effective_font_size(&config), 48.0 * 1.25);

        // Manual resize takes over: font follows the height ratio and the
        // slider no longer applies.
        let anchor = Vec2::new(
            layout.position().x - layout.box_size().width / 2.0,
            layout.position().y - layout.box_size().height / 2.0,
        );
        layout.resize_from_anchor(&config, anchor, Size2::new(300.0, h0 * 2.0));
        assert_eq!(layout.scale_mode(), ScaleMode::ManualResize);
        let h1 = layout.box_size().height;
        assert!((layout.effective_font_size(&config) - 48.0 * (h1 / h0)).abs() < 1e-3);
        layout.set_user_scale(0.5);
        assert!((layout.effective_font_size(&config) - 48.0 * (h1 / h0)).abs() < 1e-3);

        // Text change re-arms auto-fit; a fresh measurement resets H0.
        layout.set_text("New text");
        assert_eq!(layout.scale_mode(), ScaleMode::AutoFit);
        assert!(layout.needs_measure());
        layout.apply_auto_fit(&config, Size2::new(180.0, 40.0));
        assert_eq!(
            layout.box_size().height,
            40.0 + AUTO_FIT_PADDING_Y * 2.0
        );
    }

    #[test]
    fn test_auto_fit_ignored_in_manual_mode() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        layout.begin_manual_resize();
        let before = layout.box_size();
        layout.apply_auto_fit(&config, Size2::new(400.0, 90.0));
        assert_eq!(layout.box_size(), before);
    }

    #[test]
    fn test_resize_clamps_to_bounds_and_minimum() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        let bounds = layout.bounds(&config);
        let anchor = Vec2::new(bounds.x + 10.0, bounds.y + 10.0);

        // Oversized resize clamps to the space remaining from the anchor.
        layout.resize_from_anchor(&config, anchor, Size2::new(10_000.0, 10_000.0));
        assert!(bounds.contains_rect(&layout.text_rect()));
        assert!((layout.box_size().width - (bounds.right() - anchor.x)).abs() < 1e-3);

        // Undersized resize clamps to the minimum.
        layout.resize_from_anchor(&config, anchor, Size2::new(1.0, 1.0));
        assert_eq!(layout.box_size().width, MIN_TEXT_BOX.width);
        assert_eq!(layout.box_size().height, MIN_TEXT_BOX.height);
        assert!(bounds.contains_rect(&layout.text_rect()));
    }

    #[test]
    fn test_set_position_clamps() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        layout.set_position(&config, Vec2::new(-500.0, -500.0));
        let bounds = layout.bounds(&config);
        assert!(bounds.contains_rect(&layout.text_rect()));
        layout.set_position(&config, Vec2::new(9_999.0, 9_999.0));
        assert!(bounds.contains_rect(&layout.text_rect()));
    }

    #[test]
    fn test_set_font_falls_back_to_default() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        layout.set_font(&config, "'Comic Sans MS', cursive");
        assert_eq!(layout.font_value, config.default_font().value);
        layout.set_font(&config, "'Oswald', sans-serif");
        assert_eq!(layout.font_value, "'Oswald', sans-serif");
    }

    #[test]
    fn test_size_in_inches() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        layout.restore_box(
            &config,
            layout.position(),
            Size2::new(300.0, 60.0),
        );
        let inches = layout.size_in_inches(&config);
        // 300 px of a 600 px wide, 4 ft sign = 24 in.
        assert!((inches.width - 24.0).abs() < 1e-3);
        // 60 px of a 1200 px tall, 8 ft sign = 4.8 in.
        assert!((inches.height - 4.8).abs() < 1e-3);
    }

    #[test]
    fn test_background_retained_across_toggle() {
        let config = config();
        let mut layout = LayoutState::new(&config);
        layout.background.gradient = Some("sunset".to_string());
        layout.background.kind = BackgroundKind::Image;
        layout.background.image_url = Some("/uploads/bg.jpg".to_string());
        // Toggling back to color: the gradient selection is still there.
        layout.background.kind = BackgroundKind::Color;
        assert_eq!(layout.background.gradient.as_deref(), Some("sunset"));
        assert_eq!(layout.background.image_url.as_deref(), Some("/uploads/bg.jpg"));
    }
}
