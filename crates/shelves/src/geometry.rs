//! Derived geometry: segment offsets and placement extents.

use serde::{Deserialize, Serialize};

use shelfplan_core::{Entity, ShelfId, ValueObject};

use crate::segment::Segment;

/// Vertical offset of `level` on `shelf_id`: the summed height of every
/// active segment of that shelf with a strictly lower level.
///
/// Level 1 (or any level with nothing active below it) is always 0.
pub fn recompute_y_position(shelf_id: ShelfId, segments: &[Segment], level: u32) -> f64 {
    let mut below: Vec<&Segment> = segments
        .iter()
        .filter(|s| s.shelf_id() == shelf_id && s.is_active() && s.level() < level)
        .collect();
    below.sort_by_key(|s| s.level());
    below.iter().map(|s| s.height()).sum()
}

/// Forward sweep over the segments of one shelf.
///
/// Walks the active segments in level order keeping a running offset and
/// returns updated copies of every active segment at `from_level` or above
/// whose stored `y_position` differs from the recomputed one. Segments below
/// `from_level` cannot shift and are never returned. Inactive segments keep
/// whatever offset they had when they were deactivated.
pub fn sweep_y_positions(segments: &[Segment], from_level: u32) -> Vec<Segment> {
    let mut active: Vec<&Segment> = segments.iter().filter(|s| s.is_active()).collect();
    active.sort_by_key(|s| s.level());

    let mut offset = 0.0;
    let mut changed = Vec::new();
    for segment in active {
        if segment.level() >= from_level && segment.y_position() != offset {
            changed.push(segment.with_y_position(offset));
        }
        offset += segment.height();
    }
    changed
}

/// Width consumed by a placement and where it ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementGeometry {
    pub occupied_width: f64,
    pub end_position: f64,
}

impl ValueObject for PlacementGeometry {}

impl PlacementGeometry {
    /// `occupied_width = product_width * face_count`, `end_position = x + occupied_width`.
    pub fn compute(x_position: f64, product_width: f64, face_count: u32) -> Self {
        let occupied_width = product_width * f64::from(face_count);
        Self {
            occupied_width,
            end_position: x_position + occupied_width,
        }
    }
}

/// Half-open horizontal interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f64,
    pub end: f64,
}

impl ValueObject for Span {}

impl Span {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        spans_overlap(*self, *other)
    }
}

/// Two spans intersect unless one ends at or before the other starts.
/// Flush-adjacent spans (`a.end == b.start`) do not overlap.
pub fn spans_overlap(a: Span, b: Span) -> bool {
    !(a.end <= b.start || a.start >= b.end)
}
