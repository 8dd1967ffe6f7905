//! Interactive crop rectangle editing.
//!
//! [`CropSession`] is a small state machine driven by pointer events in
//! preview (canvas) coordinates:
//!
//! ```text
//!            down on handle            up
//!   Idle ───────────────────▶ Resizing ───▶ Idle
//!     │      down in body              up
//!     └─────────────────────▶ Moving ─────▶ Idle
//! ```
//!
//! Every pointer move rebuilds the rectangle from the snapshot taken on
//! pointer-down plus the cumulative pointer delta, then normalizes it to the
//! aspect constraint and clamps it to the fit rect.

mod apply;

pub use apply::{crop_image, PixelRect};

use serde::{Deserialize, Serialize};

use crate::geometry::{
    clamp_rect, conform_to_aspect, default_crop_rect, hit_test_handle, point_in_rect,
    reproject_rect, resize_rect_within, FitRect, Handle, Point, Rect,
};
use crate::params::AspectChoice;

/// Pointer input in preview coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PointerEvent {
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
}

/// What a drag is doing to the rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    Move,
    Resize(Handle),
}

/// An in-progress drag. The start snapshot never changes during the drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOp {
    pub mode: DragMode,
    pub start_pointer: Point,
    pub start_rect: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropState {
    Idle,
    Moving,
    Resizing,
}

/// Pointer cursor to show while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "handle", rename_all = "lowercase")]
pub enum CursorHint {
    Default,
    Move,
    Resize(Handle),
}

impl CursorHint {
    /// CSS cursor name, e.g. `"nw-resize"`.
    pub fn css(self) -> String {
        match self {
            CursorHint::Default => "default".to_string(),
            CursorHint::Move => "move".to_string(),
            CursorHint::Resize(handle) => format!("{}-resize", handle.as_str()),
        }
    }
}

/// Crop rectangle plus the drag in progress, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct CropSession {
    enabled: bool,
    aspect: AspectChoice,
    rect: Option<Rect>,
    drag: Option<DragOp>,
}

impl Default for CropSession {
    fn default() -> Self {
        Self {
            enabled: true,
            aspect: AspectChoice::Free,
            rect: None,
            drag: None,
        }
    }
}

impl CropSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn aspect(&self) -> AspectChoice {
        self.aspect
    }

    /// Current rectangle in preview space, `None` when cropping is off or no
    /// image is loaded.
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn drag(&self) -> Option<&DragOp> {
        self.drag.as_ref()
    }

    pub fn state(&self) -> CropState {
        match self.drag.map(|d| d.mode) {
            None => CropState::Idle,
            Some(DragMode::Move) => CropState::Moving,
            Some(DragMode::Resize(_)) => CropState::Resizing,
        }
    }

    /// Start over with a centered default rectangle inside `fit`.
    ///
    /// Leaves the session empty when cropping is disabled.
    pub fn reset(&mut self, fit: &Rect) {
        self.drag = None;
        self.rect = self
            .enabled
            .then(|| default_crop_rect(fit, self.aspect.ratio()));
    }

    /// Drop the rectangle and any drag.
    pub fn clear(&mut self) {
        self.rect = None;
        self.drag = None;
    }

    /// Turn cropping on or off.
    ///
    /// Turning it off discards the rectangle; turning it on creates a fresh
    /// default rectangle when a fit rect is available.
    pub fn set_enabled(&mut self, enabled: bool, fit: Option<&Rect>) {
        self.enabled = enabled;
        match (enabled, fit) {
            (true, Some(fit)) => self.reset(fit),
            _ => self.clear(),
        }
        tracing::debug!(enabled, "crop toggled");
    }

    /// Change the aspect constraint. An existing rectangle is replaced by a
    /// new centered default of the new shape.
    pub fn set_aspect(&mut self, aspect: AspectChoice, fit: Option<&Rect>) {
        self.aspect = aspect;
        if let (true, Some(fit)) = (self.enabled, fit) {
            self.reset(fit);
        }
        tracing::debug!(?aspect, "crop aspect changed");
    }

    /// Keep the selection on the same image pixels when the fit rect changes.
    ///
    /// A drag in progress is dropped, since its snapshot belongs to the old
    /// coordinate space.
    pub fn reproject(&mut self, from: &FitRect, to: &FitRect) {
        if let Some(rect) = self.rect {
            self.rect = Some(reproject_rect(&rect, from, to));
        }
        if self.drag.take().is_some() {
            tracing::debug!("drag cancelled by fit change");
        }
    }

    /// Feed one pointer event. Returns `true` when the rectangle or the drag
    /// state changed.
    pub fn handle_event(&mut self, event: PointerEvent, fit: &Rect) -> bool {
        match event {
            PointerEvent::Down { x, y } => self.pointer_down(Point::new(x, y), fit),
            PointerEvent::Move { x, y } => self.pointer_move(Point::new(x, y), fit),
            PointerEvent::Up => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, point: Point, fit: &Rect) -> bool {
        if self.drag.is_some() || !point_in_rect(point, fit) {
            return false;
        }
        let Some(rect) = self.rect else {
            return false;
        };

        let mode = if let Some(handle) = hit_test_handle(point, &rect) {
            DragMode::Resize(handle)
        } else if point_in_rect(point, &rect) {
            DragMode::Move
        } else {
            return false;
        };

        tracing::debug!(?mode, x = point.x, y = point.y, "drag started");
        self.drag = Some(DragOp {
            mode,
            start_pointer: point,
            start_rect: rect,
        });
        true
    }

    fn pointer_move(&mut self, point: Point, fit: &Rect) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let dx = point.x - drag.start_pointer.x;
        let dy = point.y - drag.start_pointer.y;
        let aspect = self.aspect.ratio();

        let candidate = match drag.mode {
            DragMode::Move => drag.start_rect.translate(dx, dy),
            DragMode::Resize(handle) => {
                resize_rect_within(&drag.start_rect, handle, dx, dy, aspect, fit)
            }
        };
        let candidate = match aspect {
            Some(a) => conform_to_aspect(&candidate, a),
            None => candidate,
        };

        let mut next = clamp_rect(&candidate, fit);
        if let Some(a) = aspect {
            // Clamping each side independently can break the ratio when the
            // rectangle is larger than the fit rect.
            next = conform_to_aspect(&next, a);
        }

        let changed = self.rect != Some(next);
        self.rect = Some(next);
        changed
    }

    fn pointer_up(&mut self) -> bool {
        match self.drag.take() {
            Some(_) => {
                tracing::debug!("drag ended");
                true
            }
            None => false,
        }
    }

    /// Cursor to show for a hover at `point` while idle.
    pub fn cursor_at(&self, point: Point) -> CursorHint {
        if let Some(drag) = self.drag {
            return match drag.mode {
                DragMode::Move => CursorHint::Move,
                DragMode::Resize(handle) => CursorHint::Resize(handle),
            };
        }
        let Some(rect) = self.rect else {
            return CursorHint::Default;
        };
        if let Some(handle) = hit_test_handle(point, &rect) {
            CursorHint::Resize(handle)
        } else if point_in_rect(point, &rect) {
            CursorHint::Move
        } else {
            CursorHint::Default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIT: Rect = Rect {
        x: 0.0,
        y: 0.0,
        w: 400.0,
        h: 300.0,
    };

    fn session() -> CropSession {
        let mut s = CropSession::new();
        s.reset(&FIT);
        s
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down { x, y }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move { x, y }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_reset_creates_centered_default() {
        let s = session();
        assert_eq!(s.rect(), Some(Rect::new(40.0, 30.0, 320.0, 240.0)));
        assert_eq!(s.state(), CropState::Idle);
    }

    #[test]
    fn test_down_on_handle_starts_resize() {
        let mut s = session();
        assert!(s.handle_event(down(42.0, 28.0), &FIT));
        assert_eq!(s.state(), CropState::Resizing);
        assert_eq!(s.drag().unwrap().mode, DragMode::Resize(Handle::Nw));
    }

    #[test]
    fn test_down_in_body_starts_move() {
        let mut s = session();
        assert!(s.handle_event(down(200.0, 150.0), &FIT));
        assert_eq!(s.state(), CropState::Moving);
    }

    #[test]
    fn test_down_outside_rect_or_fit_is_ignored() {
        let mut s = session();
        // Inside fit, outside crop rect.
        assert!(!s.handle_event(down(5.0, 5.0), &FIT));
        // Outside fit entirely.
        assert!(!s.handle_event(down(-20.0, 150.0), &FIT));
        assert_eq!(s.state(), CropState::Idle);
    }

    #[test]
    fn test_down_while_dragging_is_ignored() {
        let mut s = session();
        s.handle_event(down(200.0, 150.0), &FIT);
        let before = *s.drag().unwrap();
        assert!(!s.handle_event(down(42.0, 28.0), &FIT));
        assert_eq!(*s.drag().unwrap(), before);
    }

    #[test]
    fn test_move_uses_cumulative_delta() {
        let mut s = session();
        s.handle_event(down(200.0, 150.0), &FIT);
        s.handle_event(mv(210.0, 150.0), &FIT);
        s.handle_event(mv(220.0, 160.0), &FIT);
        assert_eq!(s.rect(), Some(Rect::new(60.0, 40.0, 320.0, 240.0)));
    }

    #[test]
    fn test_move_is_clamped_to_fit() {
        let mut s = session();
        s.handle_event(down(200.0, 150.0), &FIT);
        s.handle_event(mv(1000.0, -1000.0), &FIT);
        assert_eq!(s.rect(), Some(Rect::new(80.0, 0.0, 320.0, 240.0)));
    }

    #[test]
    fn test_resize_free() {
        let mut s = session();
        s.handle_event(down(360.0, 270.0), &FIT); // se corner
        s.handle_event(mv(380.0, 280.0), &FIT);
        assert_eq!(s.rect(), Some(Rect::new(40.0, 30.0, 340.0, 250.0)));
    }

    #[test]
    fn test_resize_locked_keeps_aspect_after_clamp() {
        let mut s = CropSession::new();
        s.set_aspect(AspectChoice::Fixed(1.0), Some(&FIT));
        let start = s.rect().unwrap();
        assert!(approx(start.w, start.h));

        // Drag the east edge far past the fit rect.
        let e = Handle::E.anchor(&start);
        s.handle_event(down(e.x, e.y), &FIT);
        s.handle_event(mv(e.x + 1000.0, e.y), &FIT);

        let r = s.rect().unwrap();
        assert!(approx(r.w, r.h));
        assert!(FIT.contains_rect(&r));
    }

    #[test]
    fn test_locked_overdrag_keeps_anchor_edges() {
        let mut s = CropSession::new();
        s.set_aspect(AspectChoice::Fixed(1.0), Some(&FIT));
        let start = s.rect().unwrap();
        assert_eq!(start, Rect::new(80.0, 30.0, 240.0, 240.0));

        let n = Handle::N.anchor(&start);
        s.handle_event(down(n.x, n.y), &FIT);
        s.handle_event(mv(n.x, n.y - 200.0), &FIT);
        let r = s.rect().unwrap();
        assert!(approx(r.w, r.h));
        assert!(approx(r.bottom(), 270.0));
        assert!(approx(r.center().x, 200.0));
        s.handle_event(PointerEvent::Up, &FIT);

        let nw = Handle::Nw.anchor(&start);
        s.set_aspect(AspectChoice::Fixed(1.0), Some(&FIT));
        s.handle_event(down(nw.x, nw.y), &FIT);
        s.handle_event(mv(nw.x - 200.0, nw.y - 200.0), &FIT);
        let r = s.rect().unwrap();
        assert!(approx(r.right(), 320.0));
        assert!(approx(r.bottom(), 270.0));
    }

    #[test]
    fn test_up_returns_to_idle() {
        let mut s = session();
        s.handle_event(down(200.0, 150.0), &FIT);
        assert!(s.handle_event(PointerEvent::Up, &FIT));
        assert_eq!(s.state(), CropState::Idle);
        // Stray events while idle are ignored.
        assert!(!s.handle_event(PointerEvent::Up, &FIT));
        assert!(!s.handle_event(mv(10.0, 10.0), &FIT));
    }

    #[test]
    fn test_toggle_off_then_on_gives_fresh_rect() {
        let mut s = session();
        s.handle_event(down(200.0, 150.0), &FIT);
        s.handle_event(mv(230.0, 150.0), &FIT);
        s.set_enabled(false, Some(&FIT));
        assert_eq!(s.rect(), None);
        assert_eq!(s.state(), CropState::Idle);
        s.set_enabled(true, Some(&FIT));
        assert_eq!(s.rect(), Some(Rect::new(40.0, 30.0, 320.0, 240.0)));
    }

    #[test]
    fn test_disabled_reset_leaves_no_rect() {
        let mut s = CropSession::new();
        s.set_enabled(false, None);
        s.reset(&FIT);
        assert_eq!(s.rect(), None);
    }

    #[test]
    fn test_set_aspect_rebuilds_default() {
        let mut s = session();
        s.set_aspect(AspectChoice::Fixed(16.0 / 9.0), Some(&FIT));
        let r = s.rect().unwrap();
        assert!(approx(r.w / r.h, 16.0 / 9.0));
        assert!(approx(r.w, 320.0));
        assert!(approx(r.center().x, 200.0) && approx(r.center().y, 150.0));
    }

    #[test]
    fn test_reproject_keeps_image_pixels() {
        let mut s = session();
        let from = FitRect {
            rect: FIT,
            scale: 1.0,
        };
        let to = FitRect {
            rect: Rect::new(100.0, 0.0, 800.0, 600.0),
            scale: 2.0,
        };
        s.reproject(&from, &to);
        assert_eq!(s.rect(), Some(Rect::new(180.0, 60.0, 640.0, 480.0)));
    }

    #[test]
    fn test_cursor_hints() {
        let s = session();
        assert_eq!(s.cursor_at(Point::new(40.0, 30.0)), CursorHint::Resize(Handle::Nw));
        assert_eq!(s.cursor_at(Point::new(200.0, 150.0)), CursorHint::Move);
        assert_eq!(s.cursor_at(Point::new(5.0, 5.0)), CursorHint::Default);
        assert_eq!(CursorHint::Resize(Handle::Se).css(), "se-resize");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const FIT: Rect = Rect {
        x: 10.0,
        y: 20.0,
        w: 600.0,
        h: 400.0,
    };

    proptest! {
        /// Property: whatever the pointer does, the rectangle stays inside
        /// the fit rect and keeps a locked aspect.
        #[test]
        fn prop_drag_stays_in_fit(
            locked in any::<bool>(),
            aspect in 0.3f64..3.0,
            // Grab point as a fraction of the rectangle: corners, edges, body.
            grab in prop::sample::select(vec![
                (0.0, 0.0),
                (0.5, 0.0),
                (1.0, 0.5),
                (1.0, 1.0),
                (0.0, 1.0),
                (0.5, 0.5),
            ]),
            moves in prop::collection::vec((-800.0f64..800.0, -800.0f64..800.0), 1..8),
        ) {
            let mut s = CropSession::new();
            let choice = if locked { AspectChoice::Fixed(aspect) } else { AspectChoice::Free };
            s.set_aspect(choice, Some(&FIT));
            let rect = s.rect().unwrap();

            let px = rect.x + grab.0 * rect.w;
            let py = rect.y + grab.1 * rect.h;
            s.handle_event(PointerEvent::Down { x: px, y: py }, &FIT);

            for (dx, dy) in moves {
                s.handle_event(PointerEvent::Move { x: px + dx, y: py + dy }, &FIT);
                let r = s.rect().unwrap();
                prop_assert!(FIT.contains_rect(&r));
                if locked {
                    prop_assert!((r.w / r.h - aspect).abs() < 1e-6 * aspect.max(1.0));
                }
            }
        }
    }
}
