//! Editing session wiring and boundary types.
//!
//! Configuration and layout state are explicit, constructed objects passed
//! to the renderer and rasterizer (no ambient globals), which keeps the
//! core testable in isolation. [`DesignDocument`] is the serialized form of
//! a saved/shared design; [`DesignSnapshot`] is the resolved, render-ready
//! view handed to the export rasterizer; [`SignageData`] is the outbound
//! cart payload, treated as opaque downstream.

use crate::config::{SignageConfig, SizeKey};
use crate::error::{SignError, SignResult};
use crate::gesture::GestureController;
use crate::geometry::{board_bounds, Rect, Size2, Vec2, ViewTransform};
use crate::layout::{BackgroundKind, LayoutState, LINE_HEIGHT_FACTOR};
use serde::{Deserialize, Serialize};

/// One signage editing session: injected config plus live state.
#[derive(Debug)]
pub struct EditorSession {
    pub config: SignageConfig,
    pub layout: LayoutState,
    pub gestures: GestureController,
}

impl EditorSession {
    /// Fresh session with catalog defaults.
    pub fn new(config: SignageConfig) -> Self {
        let layout = LayoutState::new(&config);
        Self {
            config,
            layout,
            gestures: GestureController::new(ViewTransform::identity()),
        }
    }

    /// Resume a previously saved design.
    pub fn with_document(config: SignageConfig, doc: &DesignDocument) -> SignResult<Self> {
        let layout = LayoutState::from_document(&config, doc)?;
        Ok(Self {
            config,
            layout,
            gestures: GestureController::new(ViewTransform::identity()),
        })
    }

    /// Resolve the current state into a render-ready snapshot.
    pub fn snapshot(&self) -> DesignSnapshot {
        DesignSnapshot::resolve(&self.config, &self.layout)
    }
}

/// Serialized form of a saved signage design (camelCase, as persisted by
/// the storefront backend).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignDocument {
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub font_family: String,
    #[serde(default)]
    pub text_color: String,
    /// Size preset key ("small".."extralarge").
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub position: Option<DocPoint>,
    #[serde(default)]
    pub text_width: Option<f32>,
    #[serde(default)]
    pub text_height: Option<f32>,
    #[serde(default)]
    pub user_text_scale: Option<f32>,
    #[serde(default)]
    pub background_type: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub background_gradient: Option<String>,
    #[serde(default)]
    pub background_image_url: Option<String>,
    #[serde(default)]
    pub vertical_board_image_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DocPoint {
    pub x: f32,
    pub y: f32,
}

impl LayoutState {
    /// Rebuild a layout from a saved document, validating selections
    /// against the catalog (unknown selections fall back to defaults).
    pub fn from_document(config: &SignageConfig, doc: &DesignDocument) -> SignResult<LayoutState> {
        let mut layout = LayoutState::new(config);

        layout.set_text(&doc.text_content);
        if !doc.font_family.is_empty() {
            layout.set_font(config, &doc.font_family);
        }
        if !doc.text_color.is_empty() {
            layout.set_text_color(&doc.text_color);
        }
        if !doc.size.is_empty() {
            match SizeKey::parse(&doc.size) {
                Some(key) => layout.set_size_key(config, key),
                None => {
                    log::warn!(target: "layout", "unknown size {:?}, keeping medium", doc.size);
                }
            }
        }
        if let Some(scale) = doc.user_text_scale {
            layout.set_user_scale(scale);
        }

        match doc.background_type.as_deref() {
            Some("image") => layout.background.kind = BackgroundKind::Image,
            Some("color") | None => layout.background.kind = BackgroundKind::Color,
            Some(other) => {
                return Err(SignError::InvalidDocument(format!(
                    "unknown background type {:?}",
                    other
                )));
            }
        }
        if let Some(color) = &doc.background_color {
            layout.background.color = color.clone();
        }
        layout.background.gradient = doc.background_gradient.clone();
        layout.background.image_url = doc.background_image_url.clone();
        if let Some(board) = &doc.vertical_board_image_url {
            layout.board_image = board.clone();
        }

        // A saved box (position + dimensions) is authoritative; without one
        // the session starts at the auto-fit defaults.
        if let (Some(p), Some(w), Some(h)) = (doc.position, doc.text_width, doc.text_height) {
            layout.restore_box(config, Vec2::new(p.x, p.y), Size2::new(w, h));
        }

        Ok(layout)
    }
}

/// Background fill resolved for rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundSpec {
    /// Flat color, optionally promoted to a gradient by identifier.
    Color {
        color: String,
        gradient: Option<String>,
    },
    /// Image cover-cropped to the design aspect.
    Image { url: String },
}

/// One laid-out text line, centered at `position` in design space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub content: String,
    pub position: Vec2,
}

/// Everything the export rasterizer needs, resolved from one layout
/// snapshot. Immutable once taken.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignSnapshot {
    pub design: Size2,
    pub board: Rect,
    pub background: BackgroundSpec,
    pub board_image: Option<String>,
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub lines: Vec<TextLine>,
    pub position: Vec2,
    pub box_size: Size2,
    pub size_key: SizeKey,
    pub text_content: String,
}

impl DesignSnapshot {
    pub fn resolve(config: &SignageConfig, layout: &LayoutState) -> DesignSnapshot {
        let design = config.canvas_size();
        let font_size = layout.effective_font_size(config);
        let position = layout.position();

        // Stack lines on the box center at 1.2x line height.
        let raw_lines = layout.display_lines();
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let total = line_height * raw_lines.len() as f32;
        let lines = raw_lines
            .iter()
            .enumerate()
            .map(|(i, content)| TextLine {
                content: content.to_string(),
                position: Vec2::new(
                    position.x,
                    position.y - total / 2.0 + line_height * (i as f32 + 0.5),
                ),
            })
            .collect();

        let background = match layout.background.kind {
            BackgroundKind::Image => match &layout.background.image_url {
                Some(url) => BackgroundSpec::Image { url: url.clone() },
                // Image mode without an image falls back to the color fill.
                None => BackgroundSpec::Color {
                    color: layout.background.color.clone(),
                    gradient: layout.background.gradient.clone(),
                },
            },
            BackgroundKind::Color => BackgroundSpec::Color {
                color: layout.background.color.clone(),
                gradient: layout.background.gradient.clone(),
            },
        };

        DesignSnapshot {
            design,
            board: board_bounds(design),
            background,
            board_image: Some(layout.board_image.clone()),
            font_family: layout.font_value.clone(),
            font_size,
            text_color: layout.text_color.clone(),
            lines,
            position,
            box_size: layout.box_size(),
            size_key: layout.size_key,
            text_content: layout.text_content.clone(),
        }
    }

    /// The metadata half of the cart submission, persisted verbatim by the
    /// cart subsystem alongside the exported image.
    pub fn signage_data(&self) -> SignageData {
        let (background_type, background_color, background_gradient, background_image_url) =
            match &self.background {
                BackgroundSpec::Color { color, gradient } => (
                    "color".to_string(),
                    Some(color.clone()),
                    gradient.clone(),
                    None,
                ),
                BackgroundSpec::Image { url } => {
                    ("image".to_string(), None, None, Some(url.clone()))
                }
            };

        SignageData {
            texts: self
                .lines
                .iter()
                .map(|line| TextSpan {
                    content: line.content.clone(),
                    x: line.position.x,
                    y: line.position.y,
                    font_size: self.font_size,
                    font_family: self.font_family.clone(),
                    color: self.text_color.clone(),
                })
                .collect(),
            background_type,
            background_color,
            background_gradient,
            background_image_url,
            text_content: self.text_content.clone(),
            font_family: self.font_family.clone(),
            font_size: self.font_size,
            text_color: self.text_color.clone(),
            text_width: self.box_size.width,
            text_height: self.box_size.height,
            size: self.size_key.as_str().to_string(),
        }
    }
}

/// One drawn text span in the outbound payload (design-space coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpan {
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub font_family: String,
    pub color: String,
}

/// Outbound signage metadata, handed to the cart subsystem verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignageData {
    pub texts: Vec<TextSpan>,
    pub background_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_url: Option<String>,
    pub text_content: String,
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub text_width: f32,
    pub text_height: f32,
    pub size: String,
}

/// The full add-to-cart submission: exported image plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSubmission {
    /// Exported raster image as a data URL.
    pub image: String,
    pub signage_data: SignageData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignageConfig;

    #[test]
    fn test_snapshot_lines_stacked_on_center() {
        let config = SignageConfig::default();
        let mut session = EditorSession::new(config);
        session.layout.set_text("Happy\nBirthday\nSam");
        let snapshot = session.snapshot();

        assert_eq!(snapshot.lines.len(), 3);
        let line_height = snapshot.font_size * LINE_HEIGHT_FACTOR;
        // Middle line sits on the box center.
        assert!((snapshot.lines[1].position.y - snapshot.position.y).abs() < 1e-3);
        assert!(
            (snapshot.lines[2].position.y - snapshot.lines[1].position.y - line_height).abs()
                < 1e-3
        );
        // All lines share the center x.
        for line in &snapshot.lines {
            assert_eq!(line.position.x, snapshot.position.x);
        }
    }

    #[test]
    fn test_snapshot_empty_text_uses_placeholder() {
        let config = SignageConfig::default();
        let session = EditorSession::new(config);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.lines.len(), 1);
        assert_eq!(snapshot.lines[0].content, "Hello");
    }

    #[test]
    fn test_snapshot_image_without_url_falls_back_to_color() {
        let config = SignageConfig::default();
        let mut session = EditorSession::new(config);
        session.layout.background.kind = BackgroundKind::Image;
        session.layout.background.image_url = None;
        let snapshot = session.snapshot();
        assert!(matches!(snapshot.background, BackgroundSpec::Color { .. }));
    }

    #[test]
    fn test_signage_data_shape() {
        let config = SignageConfig::default();
        let mut session = EditorSession::new(config);
        session.layout.set_text("Hello");
        session.layout.background.gradient = Some("sunset".to_string());
        let data = session.snapshot().signage_data();

        assert_eq!(data.texts.len(), 1);
        assert_eq!(data.texts[0].content, "Hello");
        assert_eq!(data.size, "medium");
        assert_eq!(data.background_type, "color");
        assert_eq!(data.background_gradient.as_deref(), Some("sunset"));

        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("backgroundImageUrl").is_none());
        assert!(json.get("fontFamily").is_some());
        assert!(json.get("textWidth").is_some());
    }

    #[test]
    fn test_document_roundtrip() {
        let config = SignageConfig::default();
        let doc: DesignDocument = serde_json::from_str(
            r##"{
                "textContent": "Grand Opening",
                "fontFamily": "'Oswald', sans-serif",
                "textColor": "#d4af37",
                "size": "large",
                "position": {"x": 300.0, "y": 700.0},
                "textWidth": 320.0,
                "textHeight": 90.0,
                "backgroundType": "color",
                "backgroundGradient": "ocean"
            }"##,
        )
        .unwrap();

        let session = EditorSession::with_document(config, &doc).unwrap();
        assert_eq!(session.layout.text_content, "Grand Opening");
        assert_eq!(session.layout.size_key, SizeKey::Large);
        assert_eq!(session.layout.box_size(), Size2::new(320.0, 90.0));
        // Restored box stays within the board.
        let bounds = session.layout.bounds(&session.config);
        assert!(bounds.contains_rect(&session.layout.text_rect()));
    }

    #[test]
    fn test_document_unknown_background_type_rejected() {
        let config = SignageConfig::default();
        let doc = DesignDocument {
            background_type: Some("plasma".to_string()),
            ..DesignDocument::default()
        };
        assert!(EditorSession::with_document(config, &doc).is_err());
    }
}
