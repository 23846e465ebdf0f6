//! Coordinate spaces and fitting math for the signage composer.
//!
//! Three spaces are kept distinct:
//! - *design space*: the fixed logical pixel grid derived from the physical
//!   sign dimensions (`canvas_width x canvas_height`),
//! - *container space*: the on-screen pixel box the preview renders into,
//! - *export space*: the fixed square surface the rasterizer draws into.
//!
//! [`ViewTransform`] converts between container and design space with a
//! bottom-center anchored cover fit; [`ContainFit`] maps design space into
//! the export square without cropping; [`cover_crop`] computes the source
//! rectangle for object-fit:cover image drawing.

/// A point or offset in a 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width over height. Zero-height sizes report an aspect of 1.
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// An axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn size(&self) -> Size2 {
        Size2::new(self.width, self.height)
    }

    /// Whether `inner` lies fully inside this rectangle (edges inclusive,
    /// with a small tolerance for float round-off).
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        inner.x >= self.x - EPS
            && inner.y >= self.y - EPS
            && inner.right() <= self.right() + EPS
            && inner.bottom() <= self.bottom() + EPS
    }

    /// Clamp `center` so a box of `size` centered there stays inside this
    /// rectangle. If the box is larger than the rectangle on an axis, the
    /// center snaps to the rectangle's center on that axis.
    pub fn clamp_center(&self, center: Vec2, size: Size2) -> Vec2 {
        let clamp_axis = |c: f32, half: f32, lo: f32, hi: f32| {
            if hi - lo < half * 2.0 {
                (lo + hi) / 2.0
            } else {
                c.clamp(lo + half, hi - half)
            }
        };
        Vec2::new(
            clamp_axis(center.x, size.width / 2.0, self.x, self.right()),
            clamp_axis(center.y, size.height / 2.0, self.y, self.bottom()),
        )
    }
}

/// Fraction of the canvas width occupied by the board surface.
pub const BOARD_WIDTH_RATIO: f32 = 0.76;
/// Fraction of the canvas height occupied by the board surface.
pub const BOARD_HEIGHT_RATIO: f32 = 0.82;
/// Fraction of the canvas height left below the board.
pub const BOARD_BOTTOM_MARGIN_RATIO: f32 = 0.04;

/// The board surface inside the design canvas: horizontally centered,
/// pinned toward the bottom, with wall margin above and at the sides.
///
/// All text drag/resize clamping is expressed against this rectangle.
pub fn board_bounds(canvas: Size2) -> Rect {
    let width = canvas.width * BOARD_WIDTH_RATIO;
    let height = canvas.height * BOARD_HEIGHT_RATIO;
    Rect::new(
        (canvas.width - width) / 2.0,
        canvas.height - height - canvas.height * BOARD_BOTTOM_MARGIN_RATIO,
        width,
        height,
    )
}

/// Cover-fit mapping between container (screen) space and design space.
///
/// The design always fully fills the container (`scale = max(cw/dw, ch/dh)`),
/// anchored to the container's bottom-center so the board stays pinned to
/// the bottom edge at every breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl ViewTransform {
    pub fn cover(container: Size2, design: Size2) -> Self {
        let scale = if design.width > 0.0 && design.height > 0.0 {
            (container.width / design.width).max(container.height / design.height)
        } else {
            1.0
        };
        Self {
            scale,
            offset_x: (container.width - design.width * scale) / 2.0,
            offset_y: container.height - design.height * scale,
        }
    }

    /// Identity mapping, useful when container and design space coincide.
    pub fn identity() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Container-space point back to design space.
    pub fn to_design(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            (p.x - self.offset_x) / self.scale,
            (p.y - self.offset_y) / self.scale,
        )
    }

    /// Design-space point to container space.
    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale + self.offset_x,
            p.y * self.scale + self.offset_y,
        )
    }
}

/// Contain-fit of the design rectangle into an output surface: the whole
/// design is visible, centered, possibly letterboxed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainFit {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub fn contain_fit(design: Size2, out: Size2) -> ContainFit {
    let scale = if design.width > 0.0 && design.height > 0.0 {
        (out.width / design.width).min(out.height / design.height)
    } else {
        1.0
    };
    ContainFit {
        scale,
        offset_x: (out.width - design.width * scale) / 2.0,
        offset_y: (out.height - design.height * scale) / 2.0,
    }
}

/// Source-crop rectangle for drawing `image` with object-fit:cover semantics
/// into a destination of aspect ratio `target_aspect`.
///
/// The returned rectangle has exactly the target aspect ratio and is
/// centered on whichever axis of the image is oversized.
pub fn cover_crop(image: Size2, target_aspect: f32) -> Rect {
    if image.width <= 0.0 || image.height <= 0.0 || target_aspect <= 0.0 {
        return Rect::new(0.0, 0.0, image.width.max(0.0), image.height.max(0.0));
    }
    let image_aspect = image.aspect();
    if image_aspect > target_aspect {
        // Image is too wide: crop the sides.
        let crop_width = image.height * target_aspect;
        Rect::new(
            (image.width - crop_width) / 2.0,
            0.0,
            crop_width,
            image.height,
        )
    } else {
        // Image is too tall: crop top and bottom.
        let crop_height = image.width / target_aspect;
        Rect::new(
            0.0,
            (image.height - crop_height) / 2.0,
            image.width,
            crop_height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_board_bounds_inside_canvas() {
        let canvas = Size2::new(600.0, 1200.0);
        let board = board_bounds(canvas);
        assert!(board.x > 0.0);
        assert!(board.y > 0.0);
        assert!(board.right() < canvas.width);
        assert!(board.bottom() < canvas.height);
        // Pinned toward the bottom: less margin below than above.
        assert!(canvas.height - board.bottom() < board.y);
    }

    #[test]
    fn test_view_transform_cover_fills_container() {
        let container = Size2::new(390.0, 700.0);
        let design = Size2::new(600.0, 1200.0);
        let view = ViewTransform::cover(container, design);
        // Cover fit: scaled design at least as large as the container.
        assert!(design.width * view.scale() >= container.width - 1e-3);
        assert!(design.height * view.scale() >= container.height - 1e-3);
        // Bottom-center anchor: design bottom edge maps to container bottom.
        let bottom = view.to_screen(Vec2::new(design.width / 2.0, design.height));
        assert!((bottom.y - container.height).abs() < 1e-3);
        assert!((bottom.x - container.width / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_view_transform_roundtrip() {
        let view = ViewTransform::cover(Size2::new(500.0, 420.0), Size2::new(600.0, 1200.0));
        let p = Vec2::new(123.4, 567.8);
        let back = view.to_design(view.to_screen(p));
        assert!((back.x - p.x).abs() < 1e-3);
        assert!((back.y - p.y).abs() < 1e-3);
    }

    #[test]
    fn test_contain_fit_letterboxes() {
        let fit = contain_fit(Size2::new(600.0, 1200.0), Size2::new(1200.0, 1200.0));
        assert!((fit.scale - 1.0).abs() < 1e-6);
        assert!((fit.offset_x - 300.0).abs() < 1e-3);
        assert!((fit.offset_y - 0.0).abs() < 1e-3);
    }

    #[rstest]
    #[case(Size2::new(2000.0, 1000.0), 0.5)]
    #[case(Size2::new(800.0, 3000.0), 0.5)]
    #[case(Size2::new(1000.0, 1000.0), 2.0)]
    #[case(Size2::new(640.0, 480.0), 1.3333334)]
    fn test_cover_crop_aspect(#[case] image: Size2, #[case] target_aspect: f32) {
        let crop = cover_crop(image, target_aspect);
        let crop_aspect = crop.width / crop.height;
        assert!(
            (crop_aspect - target_aspect).abs() < 1e-3,
            "crop aspect {} != target {}",
            crop_aspect,
            target_aspect
        );
        // Crop never exceeds the image.
        assert!(crop.x >= 0.0 && crop.y >= 0.0);
        assert!(crop.right() <= image.width + 1e-3);
        assert!(crop.bottom() <= image.height + 1e-3);
        // Centered on the oversized axis.
        if image.aspect() > target_aspect {
            assert!((crop.x - (image.width - crop.width) / 2.0).abs() < 1e-3);
            assert_eq!(crop.y, 0.0);
        } else {
            assert!((crop.y - (image.height - crop.height) / 2.0).abs() < 1e-3);
            assert_eq!(crop.x, 0.0);
        }
    }

    #[test]
    fn test_clamp_center_keeps_box_inside() {
        let bounds = Rect::new(72.0, 168.0, 456.0, 984.0);
        let size = Size2::new(100.0, 50.0);
        let clamped = bounds.clamp_center(Vec2::new(0.0, 0.0), size);
        assert!((clamped.x - (bounds.x + 50.0)).abs() < 1e-3);
        assert!((clamped.y - (bounds.y + 25.0)).abs() < 1e-3);

        let clamped = bounds.clamp_center(Vec2::new(10_000.0, 10_000.0), size);
        assert!((clamped.x - (bounds.right() - 50.0)).abs() < 1e-3);
        assert!((clamped.y - (bounds.bottom() - 25.0)).abs() < 1e-3);

        // A box wider than the bounds snaps to the bounds center.
        let wide = Size2::new(bounds.width * 2.0, 10.0);
        let clamped = bounds.clamp_center(Vec2::new(0.0, 500.0), wide);
        assert!((clamped.x - bounds.center().x).abs() < 1e-3);
    }
}
