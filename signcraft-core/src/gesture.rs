//! Pointer gesture handling for the interactive preview.
//!
//! Gestures keep a two-tier state: per-frame *live* values written on every
//! pointer move (read by the preview's animation loop without triggering a
//! full re-render), and the *committed* [`LayoutState`], updated once on
//! release. Drag commits on release only; resize steps flow through to the
//! layout so font sizing tracks the box height while the handle moves.
//!
//! Start/stop are idempotent: starting a gesture tears down any gesture
//! already in flight (overlapping touch-then-mouse events on some devices
//! would otherwise double-register), and finishing twice is a no-op.

use crate::config::SignageConfig;
use crate::geometry::{Size2, Vec2, ViewTransform};
use crate::layout::LayoutState;

/// A pointer event in container (screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn to_vec(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Per-frame preview values for the gesture in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LivePreview {
    pub position: Vec2,
    pub box_size: Size2,
}

#[derive(Debug, Clone, Copy)]
enum ActiveGesture {
    /// Dragging the box; offset from cursor to box center in design space.
    Drag { grab_offset: Vec2 },
    /// Resizing from the bottom-right handle; the top-left corner is fixed.
    Resize { anchor: Vec2 },
}

/// Translates pointer events into layout mutations with board clamping.
#[derive(Debug)]
pub struct GestureController {
    view: ViewTransform,
    active: Option<ActiveGesture>,
    live: Option<LivePreview>,
}

impl GestureController {
    pub fn new(view: ViewTransform) -> Self {
        Self {
            view,
            active: None,
            live: None,
        }
    }

    /// Update the container geometry (responsive breakpoints). Takes effect
    /// for subsequent gestures; an in-flight gesture keeps its mapping.
    pub fn set_view(&mut self, view: ViewTransform) {
        if self.active.is_none() {
            self.view = view;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Live values for the current frame, if a gesture is in flight.
    pub fn live(&self) -> Option<LivePreview> {
        self.live
    }

    /// Start dragging the text box. Any gesture already in flight is
    /// committed and torn down first.
    pub fn begin_drag(
        &mut self,
        config: &SignageConfig,
        layout: &mut LayoutState,
        pointer: PointerEvent,
    ) {
        if self.active.is_some() {
            log::debug!(target: "gesture", "drag start with gesture in flight, tearing down");
            self.finish(config, layout);
        }
        let cursor = self.view.to_design(pointer.to_vec());
        let center = layout.position();
        self.active = Some(ActiveGesture::Drag {
            grab_offset: Vec2::new(cursor.x - center.x, cursor.y - center.y),
        });
        self.live = Some(LivePreview {
            position: center,
            box_size: layout.box_size(),
        });
        log::debug!(target: "gesture", "drag start at {:?}", pointer);
    }

    /// Start resizing from the bottom-right handle. The top-left corner of
    /// the current box becomes the fixed anchor.
    pub fn begin_resize(
        &mut self,
        config: &SignageConfig,
        layout: &mut LayoutState,
        pointer: PointerEvent,
    ) {
        if self.active.is_some() {
            log::debug!(target: "gesture", "resize start with gesture in flight, tearing down");
            self.finish(config, layout);
        }
        let rect = layout.text_rect();
        layout.begin_manual_resize();
        self.active = Some(ActiveGesture::Resize {
            anchor: Vec2::new(rect.x, rect.y),
        });
        self.live = Some(LivePreview {
            position: layout.position(),
            box_size: layout.box_size(),
        });
        log::debug!(target: "gesture", "resize start at {:?}", pointer);
    }

    /// Pointer move. Drag updates only the live preview; resize also flows
    /// into the layout so the font-scaling rule tracks the handle.
    pub fn update(
        &mut self,
        config: &SignageConfig,
        layout: &mut LayoutState,
        pointer: PointerEvent,
    ) {
        let Some(active) = self.active else {
            return;
        };
        let cursor = self.view.to_design(pointer.to_vec());
        match active {
            ActiveGesture::Drag { grab_offset } => {
                let proposed = Vec2::new(cursor.x - grab_offset.x, cursor.y - grab_offset.y);
                let size = self
                    .live
                    .map(|l| l.box_size)
                    .unwrap_or_else(|| layout.box_size());
                let clamped = layout.bounds(config).clamp_center(proposed, size);
                self.live = Some(LivePreview {
                    position: clamped,
                    box_size: size,
                });
            }
            ActiveGesture::Resize { anchor } => {
                let proposed = Size2::new(cursor.x - anchor.x, cursor.y - anchor.y);
                layout.resize_from_anchor(config, anchor, proposed);
                self.live = Some(LivePreview {
                    position: layout.position(),
                    box_size: layout.box_size(),
                });
            }
        }
    }

    /// Pointer released: commit the live values into the layout exactly
    /// once. Safe to call when no gesture is in flight (overlapping
    /// touch/mouse release events).
    pub fn finish(&mut self, config: &SignageConfig, layout: &mut LayoutState) {
        let Some(active) = self.active.take() else {
            return;
        };
        if let Some(live) = self.live.take() {
            match active {
                ActiveGesture::Drag { .. } => {
                    layout.set_position(config, live.position);
                }
                ActiveGesture::Resize { .. } => {
                    // Resize steps already committed; re-clamp for safety.
                    layout.set_position(config, live.position);
                }
            }
        }
        log::debug!(target: "gesture", "gesture finished at {:?}", layout.position());
    }

    /// Window-blur safety net: terminate any gesture, committing the last
    /// valid live state so the layout is never left partially applied.
    pub fn cancel(&mut self, config: &SignageConfig, layout: &mut LayoutState) {
        if self.active.is_some() {
            log::debug!(target: "gesture", "gesture cancelled (blur)");
            self.finish(config, layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignageConfig;
    use crate::geometry::{Size2, ViewTransform};

    fn setup() -> (SignageConfig, LayoutState, GestureController) {
        let config = SignageConfig::default();
        let layout = LayoutState::new(&config);
        // Container half the design size: scale 0.5, bottom anchored.
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        (config, layout, GestureController::new(view))
    }

    fn screen_of(view: &ViewTransform, p: Vec2) -> PointerEvent {
        let s = view.to_screen(p);
        PointerEvent::new(s.x, s.y)
    }

    #[test]
    fn test_drag_commits_on_finish_only() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        let start = layout.position();

        gestures.begin_drag(&config, &mut layout, screen_of(&view, start));
        let target = Vec2::new(start.x + 40.0, start.y - 80.0);
        gestures.update(&config, &mut layout, screen_of(&view, target));

        // Committed state unchanged while the pointer is down.
        assert_eq!(layout.position(), start);
        let live = gestures.live().unwrap();
        assert!((live.position.x - target.x).abs() < 1e-2);
        assert!((live.position.y - target.y).abs() < 1e-2);

        gestures.finish(&config, &mut layout);
        assert!((layout.position().x - target.x).abs() < 1e-2);
        assert!((layout.position().y - target.y).abs() < 1e-2);
    }

    #[test]
    fn test_drag_clamps_to_board() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());

        let start = screen_of(&view, layout.position());
        gestures.begin_drag(&config, &mut layout, start);
        // Drag far outside the container.
        gestures.update(&config, &mut layout, PointerEvent::new(-5_000.0, -5_000.0));
        gestures.finish(&config, &mut layout);

        let bounds = layout.bounds(&config);
        assert!(bounds.contains_rect(&layout.text_rect()));
    }

    #[test]
    fn test_finish_is_idempotent() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        let start = layout.position();

        gestures.begin_drag(&config, &mut layout, screen_of(&view, start));
        let target = Vec2::new(start.x + 30.0, start.y + 30.0);
        gestures.update(&config, &mut layout, screen_of(&view, target));
        gestures.finish(&config, &mut layout);
        let committed = layout.position();

        // Second release: no panic, no double-apply, no live state left.
        gestures.finish(&config, &mut layout);
        assert_eq!(layout.position(), committed);
        assert!(gestures.live().is_none());
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_begin_tears_down_in_flight_gesture() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        let start = layout.position();

        gestures.begin_drag(&config, &mut layout, screen_of(&view, start));
        let first_target = Vec2::new(start.x + 20.0, start.y);
        gestures.update(&config, &mut layout, screen_of(&view, first_target));

        // A second pointer-down lands before the first release arrives.
        gestures.begin_drag(&config, &mut layout, screen_of(&view, first_target));
        // The first gesture's move was committed during teardown.
        assert!((layout.position().x - first_target.x).abs() < 1e-2);
        assert!(gestures.is_active());
        gestures.finish(&config, &mut layout);
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_resize_flows_into_layout() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        let rect = layout.text_rect();
        let anchor = Vec2::new(rect.x, rect.y);

        gestures.begin_resize(
            &config,
            &mut layout,
            screen_of(&view, Vec2::new(rect.right(), rect.bottom())),
        );
        let target_corner = Vec2::new(anchor.x + 320.0, anchor.y + 120.0);
        gestures.update(&config, &mut layout, screen_of(&view, target_corner));

        // Resize steps commit as they go.
        assert!((layout.box_size().width - 320.0).abs() < 1e-2);
        assert!((layout.box_size().height - 120.0).abs() < 1e-2);
        // Anchor stayed fixed: center = anchor + half size.
        assert!((layout.position().x - (anchor.x + 160.0)).abs() < 1e-2);
        assert!((layout.position().y - (anchor.y + 60.0)).abs() < 1e-2);

        gestures.finish(&config, &mut layout);
        let bounds = layout.bounds(&config);
        assert!(bounds.contains_rect(&layout.text_rect()));
    }

    #[test]
    fn test_cancel_leaves_valid_state() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());

        let start = screen_of(&view, layout.position());
        gestures.begin_drag(&config, &mut layout, start);
        gestures.update(&config, &mut layout, PointerEvent::new(9_999.0, 9_999.0));
        gestures.cancel(&config, &mut layout);

        assert!(!gestures.is_active());
        let bounds = layout.bounds(&config);
        assert!(bounds.contains_rect(&layout.text_rect()));

        // Cancel with nothing in flight is a no-op.
        gestures.cancel(&config, &mut layout);
    }

    #[test]
    fn test_random_gesture_sequences_respect_bounds() {
        let (config, mut layout, mut gestures) = setup();
        let view = ViewTransform::cover(Size2::new(300.0, 600.0), config.canvas_size());
        let bounds = layout.bounds(&config);

        // Deterministic pseudo-random walk over drags and resizes.
        let mut seed: u32 = 0x5eed;
        let mut next = || {
            seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
            (seed >> 8) as f32 / 16_777_216.0
        };

        for round in 0..50 {
            let x = next() * 800.0 - 200.0;
            let y = next() * 1400.0 - 100.0;
            let anchor = screen_of(&view, layout.position());
            if round % 2 == 0 {
                gestures.begin_drag(&config, &mut layout, anchor);
            } else {
                gestures.begin_resize(&config, &mut layout, anchor);
            }
            gestures.update(&config, &mut layout, screen_of(&view, Vec2::new(x, y)));
            gestures.finish(&config, &mut layout);
            assert!(
                bounds.contains_rect(&layout.text_rect()),
                "round {}: box {:?} escaped bounds {:?}",
                round,
                layout.text_rect(),
                bounds
            );
        }
    }
}
