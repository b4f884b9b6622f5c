use super::{FloatRect, MinSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
    Top,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ResizeEdge {
    fn west(self) -> bool {
        matches!(
            self,
            ResizeEdge::Left | ResizeEdge::TopLeft | ResizeEdge::BottomLeft
        )
    }

    fn east(self) -> bool {
        matches!(
            self,
            ResizeEdge::Right | ResizeEdge::TopRight | ResizeEdge::BottomRight
        )
    }

    fn north(self) -> bool {
        matches!(
            self,
            ResizeEdge::Top | ResizeEdge::TopLeft | ResizeEdge::TopRight
        )
    }

    fn south(self) -> bool {
        matches!(
            self,
            ResizeEdge::Bottom | ResizeEdge::BottomLeft | ResizeEdge::BottomRight
        )
    }
}

/// Where a pointer landed on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitZone {
    Edge(ResizeEdge),
    Interior,
}

/// Classify a pointer position against `rect` into one of nine zones.
///
/// Each edge owns a band `threshold` logical pixels wide, measured inward.
/// When a pointer sits in two bands at once the corner wins. Returns `None`
/// when the pointer is outside the panel.
pub fn hit_zone(rect: FloatRect, px: f64, py: f64, threshold: f64) -> Option<HitZone> {
    if !rect.contains(px, py) {
        return None;
    }
    let left = px - rect.x < threshold;
    let right = rect.right() - px <= threshold;
    let top = py - rect.y < threshold;
    let bottom = rect.bottom() - py <= threshold;

    let edge = match (left, right, top, bottom) {
        (true, _, true, _) => ResizeEdge::TopLeft,
        (_, true, true, _) => ResizeEdge::TopRight,
        (true, _, _, true) => ResizeEdge::BottomLeft,
        (_, true, _, true) => ResizeEdge::BottomRight,
        (true, _, _, _) => ResizeEdge::Left,
        (_, true, _, _) => ResizeEdge::Right,
        (_, _, true, _) => ResizeEdge::Top,
        (_, _, _, true) => ResizeEdge::Bottom,
        _ => return Some(HitZone::Interior),
    };
    Some(HitZone::Edge(edge))
}

/// Snapshot taken when a resize drag starts. Every frame is computed
/// against this snapshot, never against the previous frame.
#[derive(Debug, Clone, Copy)]
pub struct ResizeDrag {
    pub edge: ResizeEdge,
    pub start: FloatRect,
    pub start_x: f64,
    pub start_y: f64,
}

impl ResizeDrag {
    pub fn new(edge: ResizeEdge, start: FloatRect, start_x: f64, start_y: f64) -> Self {
        Self {
            edge,
            start,
            start_x,
            start_y,
        }
    }

    pub fn apply(&self, px: f64, py: f64, min: MinSize) -> FloatRect {
        apply_resize_drag(
            self.start,
            self.edge,
            px - self.start_x,
            py - self.start_y,
            min,
        )
    }
}

/// Resolve a resize drag of `start` by (`dx`, `dy`).
///
/// East and south edges grow or shrink the dimension and clamp it to the
/// minimum; the origin stays put. West and north edges move the origin with
/// the pointer while the proposed dimension stays at or above the minimum.
/// Past that point the axis is pinned at the minimum and the origin stops
/// where the minimum was reached, so the panel never slides past the cursor.
pub fn apply_resize_drag(
    start: FloatRect,
    edge: ResizeEdge,
    dx: f64,
    dy: f64,
    min: MinSize,
) -> FloatRect {
    let mut out = start;

    if edge.east() {
        out.width = (start.width + dx).max(min.width);
    } else if edge.west() {
        let (x, width) = pull_near_edge(start.x, start.width, dx, min.width);
        out.x = x;
        out.width = width;
    }

    if edge.south() {
        out.height = (start.height + dy).max(min.height);
    } else if edge.north() {
        let (y, height) = pull_near_edge(start.y, start.height, dy, min.height);
        out.y = y;
        out.height = height;
    }

    out
}

fn pull_near_edge(origin: f64, dimension: f64, delta: f64, min: f64) -> (f64, f64) {
    let proposed = dimension - delta;
    if proposed >= min {
        return (origin + delta, proposed);
    }
    if dimension <= min {
        // Already at (or below) the floor: nothing valid to shrink towards.
        return (origin, dimension);
    }
    (origin + (dimension - min), min)
}

/// Snapshot taken when a header (move) drag starts.
#[derive(Debug, Clone, Copy)]
pub struct MoveDrag {
    pub initial_x: f64,
    pub initial_y: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl MoveDrag {
    pub fn new(rect: FloatRect, start_x: f64, start_y: f64) -> Self {
        Self {
            initial_x: rect.x,
            initial_y: rect.y,
            start_x,
            start_y,
        }
    }

    pub fn apply(&self, px: f64, py: f64) -> (f64, f64) {
        (
            self.initial_x + (px - self.start_x),
            self.initial_y + (py - self.start_y),
        )
    }
}

/// Holds the most recent geometry produced by a drag so that a burst of
/// pointer events between two frames results in a single registry commit.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
    coalesced: usize,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            coalesced: 0,
        }
    }
}

impl<T> FrameCoalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) {
        if self.pending.replace(value).is_some() {
            self.coalesced += 1;
        }
    }

    /// Take the pending commit for this frame, if any.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of pushes that were superseded before they could be committed.
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: MinSize = MinSize::new(200.0, 150.0);

    fn start() -> FloatRect {
        FloatRect::new(100.0, 100.0, 400.0, 300.0)
    }

    #[test]
    fn hit_zone_prefers_corners() {
        let r = start();
        assert_eq!(
            hit_zone(r, 101.0, 101.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::TopLeft))
        );
        assert_eq!(
            hit_zone(r, 499.0, 399.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::BottomRight))
        );
        assert_eq!(
            hit_zone(r, 495.0, 102.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::TopRight))
        );
        assert_eq!(
            hit_zone(r, 103.0, 395.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::BottomLeft))
        );
    }

    #[test]
    fn hit_zone_edges_and_interior() {
        let r = start();
        assert_eq!(
            hit_zone(r, 104.0, 250.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::Left))
        );
        assert_eq!(
            hit_zone(r, 493.0, 250.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::Right))
        );
        assert_eq!(
            hit_zone(r, 300.0, 107.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::Top))
        );
        assert_eq!(
            hit_zone(r, 300.0, 393.0, 8.0),
            Some(HitZone::Edge(ResizeEdge::Bottom))
        );
        assert_eq!(hit_zone(r, 300.0, 250.0, 8.0), Some(HitZone::Interior));
        assert_eq!(hit_zone(r, 50.0, 250.0, 8.0), None);
    }

    #[test]
    fn east_and_south_clamp_without_moving_origin() {
        let out = apply_resize_drag(start(), ResizeEdge::BottomRight, -1000.0, -1000.0, MIN);
        assert_eq!(out, FloatRect::new(100.0, 100.0, 200.0, 150.0));

        let out = apply_resize_drag(start(), ResizeEdge::Right, 50.0, 999.0, MIN);
        assert_eq!(out, FloatRect::new(100.0, 100.0, 450.0, 300.0));
    }

    #[test]
    fn west_edge_tracks_pointer_above_minimum() {
        let out = apply_resize_drag(start(), ResizeEdge::Left, 120.0, 0.0, MIN);
        assert_eq!(out, FloatRect::new(220.0, 100.0, 280.0, 300.0));

        let out = apply_resize_drag(start(), ResizeEdge::Left, -50.0, 0.0, MIN);
        assert_eq!(out, FloatRect::new(50.0, 100.0, 450.0, 300.0));
    }

    #[test]
    fn west_edge_freezes_origin_at_minimum() {
        // Dragging the west edge 1000px right: the width stops at 200 and
        // the origin advances exactly 200px, no further.
        let out = apply_resize_drag(start(), ResizeEdge::Left, 1000.0, 0.0, MIN);
        assert_eq!(out.width, 200.0);
        assert_eq!(out.x, 300.0);
        assert_eq!(out.right(), start().right());
    }

    #[test]
    fn north_edge_freezes_origin_at_minimum() {
        let out = apply_resize_drag(start(), ResizeEdge::Top, 0.0, 500.0, MIN);
        assert_eq!(out.height, 150.0);
        assert_eq!(out.y, 250.0);
        assert_eq!(out.bottom(), start().bottom());
    }

    #[test]
    fn diagonal_applies_both_axes_independently() {
        let out = apply_resize_drag(start(), ResizeEdge::TopLeft, 1000.0, 20.0, MIN);
        assert_eq!(out, FloatRect::new(300.0, 120.0, 200.0, 280.0));

        let out = apply_resize_drag(start(), ResizeEdge::BottomLeft, -10.0, 40.0, MIN);
        assert_eq!(out, FloatRect::new(90.0, 100.0, 410.0, 340.0));
    }

    #[test]
    fn drag_is_relative_to_start_snapshot() {
        let drag = ResizeDrag::new(ResizeEdge::Right, start(), 500.0, 250.0);
        let _ = drag.apply(900.0, 250.0, MIN);
        let out = drag.apply(520.0, 250.0, MIN);
        assert_eq!(out.width, 420.0);
    }

    #[test]
    fn move_drag_allows_offscreen() {
        let drag = MoveDrag::new(start(), 150.0, 110.0);
        assert_eq!(drag.apply(-500.0, 10.0), (-550.0, 0.0));
    }

    #[test]
    fn coalescer_keeps_latest_only() {
        let mut c = FrameCoalescer::new();
        assert!(c.take().is_none());
        c.push(1);
        c.push(2);
        c.push(3);
        assert!(c.is_pending());
        assert_eq!(c.take(), Some(3));
        assert_eq!(c.coalesced(), 2);
        assert!(c.take().is_none());
    }
}
