//! Background gradient palette.
//!
//! Gradients are identified by a stable id carrying explicit color stops
//! end-to-end; the admin catalog and saved designs reference these ids.
//! Unknown ids resolve to `None` and the caller falls back to a flat fill
//! of the stored base color.

/// A color stop in a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Offset position (0.0 to 1.0).
    pub offset: f32,
    /// Color at this stop.
    pub color: tiny_skia::Color,
}

/// A named gradient definition with explicit stops.
#[derive(Debug, Clone, Copy)]
pub struct GradientDef {
    pub id: &'static str,
    stops: &'static [(f32, [u8; 3])],
}

impl GradientDef {
    /// Stops resolved to colors, sorted by offset.
    pub fn stops(&self) -> Vec<GradientStop> {
        let mut stops: Vec<GradientStop> = self
            .stops
            .iter()
            .map(|&(offset, [r, g, b])| GradientStop {
                offset,
                color: tiny_skia::Color::from_rgba8(r, g, b, 255),
            })
            .collect();
        stops.sort_by(|a, b| {
            a.offset
                .partial_cmp(&b.offset)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        stops
    }
}

/// The built-in gradient palette.
pub const GRADIENTS: &[GradientDef] = &[
    GradientDef {
        id: "sunset",
        stops: &[(0.0, [255, 94, 98]), (0.5, [255, 153, 102]), (1.0, [255, 195, 113])],
    },
    GradientDef {
        id: "ocean",
        stops: &[(0.0, [43, 88, 118]), (1.0, [78, 67, 118])],
    },
    GradientDef {
        id: "forest",
        stops: &[(0.0, [19, 78, 94]), (1.0, [113, 178, 128])],
    },
    GradientDef {
        id: "midnight",
        stops: &[(0.0, [35, 37, 38]), (1.0, [65, 67, 69])],
    },
    GradientDef {
        id: "blush",
        stops: &[(0.0, [221, 94, 137]), (1.0, [247, 187, 151])],
    },
    GradientDef {
        id: "gold",
        stops: &[(0.0, [191, 149, 63]), (1.0, [252, 246, 186])],
    },
];

/// Look up a gradient by id. Unknown ids return `None`; the caller falls
/// back to a flat fill.
pub fn resolve(id: &str) -> Option<&'static GradientDef> {
    GRADIENTS.iter().find(|g| g.id == id)
}
