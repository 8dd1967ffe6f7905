//! Handle-driven rectangle resizing, free or aspect-locked.
//!
//! The resize is always computed from the rectangle captured when the drag
//! started plus the cumulative pointer delta, so repeated pointer moves never
//! accumulate rounding drift.

use super::{Handle, Rect, MIN_CROP_SIZE};

/// Resize `start` by dragging `handle` by `(dx, dy)`.
///
/// Edges that the handle does not control stay where they were. With an
/// `aspect` (width / height) the result keeps that ratio exactly:
///
/// - corner handles follow whichever axis moved further
/// - edge handles follow their own axis, and the other axis is re-centered
///   on the midpoint of the original span
///
/// Neither dimension drops below [`MIN_CROP_SIZE`]. When the floor kicks in
/// the fixed edges stay put; only the dragged edges stop moving.
pub fn resize_rect(start: &Rect, handle: Handle, dx: f64, dy: f64, aspect: Option<f64>) -> Rect {
    match aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => {
            resize_locked(start, handle, dx, dy, aspect)
        }
        _ => resize_free(start, handle, dx, dy),
    }
}

fn resize_free(start: &Rect, handle: Handle, dx: f64, dy: f64) -> Rect {
    let mut w = start.w;
    let mut h = start.h;

    if handle.has_east() {
        w = start.w + dx;
    }
    if handle.has_west() {
        w = start.w - dx;
    }
    if handle.has_south() {
        h = start.h + dy;
    }
    if handle.has_north() {
        h = start.h - dy;
    }

    let w = w.max(MIN_CROP_SIZE);
    let h = h.max(MIN_CROP_SIZE);

    // West/north drags move the origin; the opposite edge is the anchor.
    let x = if handle.has_west() {
        start.right() - w
    } else {
        start.x
    };
    let y = if handle.has_north() {
        start.bottom() - h
    } else {
        start.y
    };

    Rect::new(x, y, w, h)
}

fn resize_locked(start: &Rect, handle: Handle, dx: f64, dy: f64, aspect: f64) -> Rect {
    let horizontal = handle.has_east() || handle.has_west();
    let vertical = handle.has_north() || handle.has_south();
    let sign_x = if handle.has_east() {
        1.0
    } else if handle.has_west() {
        -1.0
    } else {
        0.0
    };
    let sign_y = if handle.has_south() {
        1.0
    } else if handle.has_north() {
        -1.0
    } else {
        0.0
    };

    let drive_vertical = if horizontal && vertical {
        dy.abs() > dx.abs()
    } else {
        vertical
    };

    let (mut w, mut h) = if drive_vertical {
        let h = start.h + sign_y * dy;
        (h * aspect, h)
    } else {
        let w = start.w + sign_x * dx;
        (w, w / aspect)
    };

    // Raise the floor along the ratio so both sides clear the minimum.
    if w < MIN_CROP_SIZE {
        w = MIN_CROP_SIZE;
        h = w / aspect;
    }
    if h < MIN_CROP_SIZE {
        h = MIN_CROP_SIZE;
        w = h * aspect;
    }

    place(start, handle, w, h)
}

/// Like [`resize_rect`], but the dragged edges stop at `bounds`.
///
/// Over-dragging past `bounds` caps the size instead of shifting the rect,
/// so the anchor edges (and, for a locked edge handle, the perpendicular
/// center) stay where they were. `start` is expected to lie inside `bounds`.
pub fn resize_rect_within(
    start: &Rect,
    handle: Handle,
    dx: f64,
    dy: f64,
    aspect: Option<f64>,
    bounds: &Rect,
) -> Rect {
    let rect = resize_rect(start, handle, dx, dy, aspect);
    let (max_w, max_h) = max_extent(start, handle, bounds);

    match aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => {
            let limit = max_w.min(max_h * aspect);
            let floor = MIN_CROP_SIZE.max(MIN_CROP_SIZE * aspect);
            if rect.w <= limit || limit < floor {
                return rect;
            }
            place(start, handle, limit, limit / aspect)
        }
        _ => {
            let mut w = rect.w;
            let mut h = rect.h;
            if handle.has_east() || handle.has_west() {
                w = w.min(max_w).max(MIN_CROP_SIZE);
            }
            if handle.has_north() || handle.has_south() {
                h = h.min(max_h).max(MIN_CROP_SIZE);
            }
            place(start, handle, w, h)
        }
    }
}

/// Largest width and height reachable from the handle's anchor inside
/// `bounds`.
fn max_extent(start: &Rect, handle: Handle, bounds: &Rect) -> (f64, f64) {
    let center = start.center();
    let max_w = if handle.has_east() {
        bounds.right() - start.x
    } else if handle.has_west() {
        start.right() - bounds.x
    } else {
        2.0 * (center.x - bounds.x).min(bounds.right() - center.x)
    };
    let max_h = if handle.has_south() {
        bounds.bottom() - start.y
    } else if handle.has_north() {
        start.bottom() - bounds.y
    } else {
        2.0 * (center.y - bounds.y).min(bounds.bottom() - center.y)
    };
    (max_w, max_h)
}

/// Position a `w`x`h` rect so the edges `handle` does not own keep their
/// place. Axes the handle does not touch stay centered on `start`.
fn place(start: &Rect, handle: Handle, w: f64, h: f64) -> Rect {
    let x = if handle.has_west() {
        start.right() - w
    } else if handle.has_east() {
        start.x
    } else {
        start.x + (start.w - w) / 2.0
    };
    let y = if handle.has_north() {
        start.bottom() - h
    } else if handle.has_south() {
        start.y
    } else {
        start.y + (start.h - h) / 2.0
    };

    Rect::new(x, y, w, h)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn handle_strategy() -> impl Strategy<Value = Handle> {
        (0usize..8).prop_map(|i| Handle::ALL[i])
    }

    fn start_strategy() -> impl Strategy<Value = Rect> {
        (-200.0f64..200.0, -200.0f64..200.0, 40.0f64..800.0, 40.0f64..800.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        /// Property: aspect-locked resize keeps the ratio and the floor.
        #[test]
        fn prop_locked_ratio_and_floor(
            start in start_strategy(),
            handle in handle_strategy(),
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
            aspect in 0.1f64..10.0,
        ) {
            let out = resize_rect(&start, handle, dx, dy, Some(aspect));
            prop_assert!((out.w / out.h - aspect).abs() < 1e-9 * aspect.max(1.0));
            prop_assert!(out.w >= MIN_CROP_SIZE - 1e-9);
            prop_assert!(out.h >= MIN_CROP_SIZE - 1e-9);
        }

        /// Property: free resize never goes below the floor.
        #[test]
        fn prop_free_floor(
            start in start_strategy(),
            handle in handle_strategy(),
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
        ) {
            let out = resize_rect(&start, handle, dx, dy, None);
            prop_assert!(out.w >= MIN_CROP_SIZE && out.h >= MIN_CROP_SIZE);
        }

        /// Property: a bounded resize that starts inside `bounds` stays
        /// inside and keeps the ratio.
        #[test]
        fn prop_within_stays_in_bounds(
            handle in handle_strategy(),
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
            aspect in 0.5f64..2.0,
            locked in any::<bool>(),
        ) {
            let bounds = Rect::new(0.0, 0.0, 600.0, 400.0);
            let start = Rect::new(150.0, 100.0, 100.0 * aspect, 100.0);
            let aspect = if locked { Some(aspect) } else { None };
            let out = resize_rect_within(&start, handle, dx, dy, aspect, &bounds);
            prop_assert!(bounds.contains_rect(&out));
            if let Some(a) = aspect {
                prop_assert!((out.w / out.h - a).abs() < 1e-9 * a.max(1.0));
            }
        }

        /// Property: edges not owned by the handle stay fixed in free mode.
        #[test]
        fn prop_free_opposite_edges_fixed(
            start in start_strategy(),
            handle in handle_strategy(),
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
        ) {
            let out = resize_rect(&start, handle, dx, dy, None);
            if !handle.has_west() {
                prop_assert!((out.x - start.x).abs() < 1e-9);
            }
            if !handle.has_east() {
                prop_assert!((out.right() - start.right()).abs() < 1e-9);
            }
            if !handle.has_north() {
                prop_assert!((out.y - start.y).abs() < 1e-9);
            }
            if !handle.has_south() {
                prop_assert!((out.bottom() - start.bottom()).abs() < 1e-9);
            }
        }
    }
}
