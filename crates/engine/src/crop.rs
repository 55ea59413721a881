//! Handle-drag controller for the crop overlay.
//!
//! A drag is always computed from the state captured at pointer-down, so
//! replaying the same pointer position yields the same region no matter how
//! many moves came before it.

use core_types::{CropHandle, CropRegion, DisplaySize, HandleEdges};

/// Pointer and crop state captured when a drag starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub origin_x: f64,
    pub origin_y: f64,
    pub origin_crop: CropRegion,
    pub handle: CropHandle,
}

impl DragSession {
    /// Starts a drag. The captured crop is clamped to `display` first.
    pub fn begin(
        handle: CropHandle,
        pointer_x: f64,
        pointer_y: f64,
        crop: CropRegion,
        display: DisplaySize,
    ) -> Self {
        Self {
            origin_x: finite_or_zero(pointer_x),
            origin_y: finite_or_zero(pointer_y),
            origin_crop: crop.clamped_to(display),
            handle,
        }
    }

    /// Region for the pointer now being at (`pointer_x`, `pointer_y`).
    pub fn update(&self, pointer_x: f64, pointer_y: f64, display: DisplaySize) -> CropRegion {
        let dx = finite_or_zero(pointer_x - self.origin_x);
        let dy = finite_or_zero(pointer_y - self.origin_y);
        drag(self.origin_crop, self.handle, dx, dy, display)
    }
}

/// Applies a pointer delta to `origin` and clamps the result.
pub fn drag(
    origin: CropRegion,
    handle: CropHandle,
    dx: f64,
    dy: f64,
    display: DisplaySize,
) -> CropRegion {
    let dx = finite_or_zero(dx);
    let dy = finite_or_zero(dy);
    let (min_w, min_h) = display.min_crop();

    if handle == CropHandle::Move {
        let x = translate_within(origin.x + dx, origin.width, display.width);
        let y = translate_within(origin.y + dy, origin.height, display.height);
        return CropRegion::new(x, y, origin.width, origin.height);
    }

    let edges = handle.edges();
    let (left, right) = resize_span(
        origin.x,
        origin.right(),
        dx,
        edges.contains(HandleEdges::LEFT),
        edges.contains(HandleEdges::RIGHT),
        min_w,
        display.width,
    );
    let (top, bottom) = resize_span(
        origin.y,
        origin.bottom(),
        dy,
        edges.contains(HandleEdges::TOP),
        edges.contains(HandleEdges::BOTTOM),
        min_h,
        display.height,
    );
    CropRegion::new(left, top, right - left, bottom - top)
}

/// Moves the `start` and/or `end` edge of a span by `delta`, then applies the
/// minimum size, the zero edge and the far bound, in that order.
fn resize_span(
    mut start: f64,
    mut end: f64,
    delta: f64,
    moves_start: bool,
    moves_end: bool,
    min_len: f64,
    bound: f64,
) -> (f64, f64) {
    if moves_start {
        start += delta;
    }
    if moves_end {
        end += delta;
    }

    if end - start < min_len {
        if moves_start {
            start = end - min_len;
        } else {
            end = start + min_len;
        }
    }
    if start < 0.0 {
        start = 0.0;
    }
    if end > bound {
        end = bound;
    }
    (start, end)
}

/// Positions a span of `len` starting near `start`, clipped at zero and pushed
/// back inside `bound`.
fn translate_within(start: f64, len: f64, bound: f64) -> f64 {
    let start = start.max(0.0);
    if start + len > bound {
        (bound - len).max(0.0)
    } else {
        start
    }
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MIN_CROP_SIZE;
    use proptest::prelude::*;

    fn display() -> DisplaySize {
        DisplaySize::new(400.0, 300.0)
    }

    #[test]
    fn left_handle_moves_x_and_compensates_width() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::LeftMiddle, 30.0, 99.0, display());
        assert_eq!(out, CropRegion::new(130.0, 50.0, 170.0, 100.0));
    }

    #[test]
    fn corner_handle_changes_both_axes() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::BottomRight, 50.0, 40.0, display());
        assert_eq!(out, CropRegion::new(100.0, 50.0, 250.0, 140.0));
    }

    #[test]
    fn collapsing_pins_minimum_and_keeps_opposite_edge() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::LeftMiddle, 500.0, 0.0, display());
        assert_eq!(out.width, MIN_CROP_SIZE);
        assert_eq!(out.right(), 300.0);

        let out = drag(crop, CropHandle::TopMiddle, 0.0, 1_000.0, display());
        assert_eq!(out.height, MIN_CROP_SIZE);
        assert_eq!(out.bottom(), 150.0);
    }

    #[test]
    fn negative_edge_is_clipped_and_dimension_shrinks() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::TopLeft, -150.0, -80.0, display());
        assert_eq!(out, CropRegion::new(0.0, 0.0, 300.0, 150.0));
    }

    #[test]
    fn far_edge_lands_on_bound() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::RightMiddle, 500.0, 0.0, display());
        assert_eq!(out, CropRegion::new(100.0, 50.0, 300.0, 100.0));
    }

    #[test]
    fn move_translates_back_inside_without_resizing() {
        let crop = CropRegion::new(100.0, 50.0, 200.0, 100.0);
        let out = drag(crop, CropHandle::Move, 500.0, -500.0, display());
        assert_eq!(out, CropRegion::new(200.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn session_deltas_are_relative_to_pointer_down() {
        let crop = CropRegion::full(display());
        let session = DragSession::begin(CropHandle::BottomRight, 400.0, 300.0, crop, display());
        let first = session.update(350.0, 280.0, display());
        let _ = session.update(10.0, 10.0, display());
        let again = session.update(350.0, 280.0, display());
        assert_eq!(first, again);
        assert_eq!(first, CropRegion::new(0.0, 0.0, 350.0, 280.0));
    }

    #[test]
    fn non_finite_pointer_is_ignored() {
        let crop = CropRegion::new(10.0, 10.0, 50.0, 50.0);
        let session = DragSession::begin(CropHandle::Move, 0.0, 0.0, crop, display());
        assert_eq!(session.update(f64::NAN, f64::INFINITY, display()), crop);
    }

    fn handle_strategy() -> impl Strategy<Value = CropHandle> {
        prop_oneof![
            Just(CropHandle::TopLeft),
            Just(CropHandle::TopMiddle),
            Just(CropHandle::TopRight),
            Just(CropHandle::RightMiddle),
            Just(CropHandle::BottomRight),
            Just(CropHandle::BottomMiddle),
            Just(CropHandle::BottomLeft),
            Just(CropHandle::LeftMiddle),
            Just(CropHandle::Move),
        ]
    }

    proptest! {
        #[test]
        fn any_drag_sequence_keeps_crop_valid(
            width in 1.0f64..2_000.0,
            height in 1.0f64..2_000.0,
            start in (-500.0f64..2_500.0, -500.0f64..2_500.0, -100.0f64..3_000.0, -100.0f64..3_000.0),
            gestures in prop::collection::vec(
                (handle_strategy(), prop::collection::vec((-3_000.0f64..3_000.0, -3_000.0f64..3_000.0), 1..6)),
                1..12,
            ),
        ) {
            let display = DisplaySize::new(width, height);
            let mut crop = CropRegion::new(start.0, start.1, start.2, start.3);
            for (handle, moves) in gestures {
                let session = DragSession::begin(handle, 0.0, 0.0, crop, display);
                prop_assert!(session.origin_crop.is_valid_within(display));
                for (px, py) in moves {
                    crop = session.update(px, py, display);
                    prop_assert!(
                        crop.is_valid_within(display),
                        "{handle} to ({px}, {py}) gave {crop:?} in {display:?}"
                    );
                }
            }
        }
    }
}
