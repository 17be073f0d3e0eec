//! Placement constraint validation.
//!
//! The validator is a pure decision function over a proposed placement and
//! the committed state of its siblings. Every check runs; violations are
//! accumulated so callers can report all problems at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shelfplan_core::{Entity, PlacementId, ShelfId};
use shelfplan_products::Product;

use crate::geometry::spans_overlap;
use crate::placement::Placement;
use crate::segment::Segment;
use crate::shelf::Shelf;

/// A caller-correctable layout rule violation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Violation {
    #[error("product height ({product_height}cm) exceeds segment height ({segment_height}cm)")]
    HeightExceeded {
        product_height: f64,
        segment_height: f64,
    },

    #[error("span [{x_position}, {end_position}) does not fit the shelf width ({shelf_width}cm)")]
    WidthExceeded {
        x_position: f64,
        end_position: f64,
        shelf_width: f64,
    },

    #[error("face count {face_count} is outside the allowed range {min}..={max}")]
    FaceCountOutOfRange { face_count: u32, min: u32, max: u32 },

    #[error("overlaps placement {placement_id} occupying [{start}, {end})")]
    OverlapDetected {
        placement_id: PlacementId,
        start: f64,
        end: f64,
    },

    #[error("segment belongs to shelf {segment_shelf}, not shelf {shelf}")]
    SegmentShelfMismatch {
        segment_shelf: ShelfId,
        shelf: ShelfId,
    },

    #[error(
        "segment height {requested_height}cm is below the tallest placed product ({tallest_product}cm)"
    )]
    SegmentTooSmallForExisting {
        requested_height: f64,
        tallest_product: f64,
    },
}

impl Violation {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Violation::HeightExceeded { .. } => "HEIGHT_EXCEEDED",
            Violation::WidthExceeded { .. } => "WIDTH_EXCEEDED",
            Violation::FaceCountOutOfRange { .. } => "FACE_COUNT_OUT_OF_RANGE",
            Violation::OverlapDetected { .. } => "OVERLAP_DETECTED",
            Violation::SegmentShelfMismatch { .. } => "SEGMENT_SHELF_MISMATCH",
            Violation::SegmentTooSmallForExisting { .. } => "SEGMENT_TOO_SMALL_FOR_EXISTING",
        }
    }
}

/// Committed state a candidate is checked against.
#[derive(Debug, Clone, Copy)]
pub struct LayoutSnapshot<'a> {
    /// The shelf named by the candidate.
    pub shelf: &'a Shelf,
    /// The segment named by the candidate.
    pub segment: &'a Segment,
    /// Placements currently stored for the segment (inactive ones are ignored).
    pub siblings: &'a [Placement],
}

/// Check `candidate` (built from `product`) against `snapshot`.
///
/// `exclude` names the placement being updated so it is not compared with
/// its own stored version.
pub fn validate(
    candidate: &Placement,
    product: &Product,
    snapshot: &LayoutSnapshot<'_>,
    exclude: Option<PlacementId>,
) -> Result<(), Vec<Violation>> {
    let mut violations = Vec::new();

    if snapshot.segment.shelf_id() != candidate.shelf_id() {
        violations.push(Violation::SegmentShelfMismatch {
            segment_shelf: snapshot.segment.shelf_id(),
            shelf: candidate.shelf_id(),
        });
    }

    if product.height() > snapshot.segment.height() {
        violations.push(Violation::HeightExceeded {
            product_height: product.height(),
            segment_height: snapshot.segment.height(),
        });
    }

    let end = candidate.end_position();
    if candidate.x_position() < 0.0 || end > snapshot.shelf.width() {
        violations.push(Violation::WidthExceeded {
            x_position: candidate.x_position(),
            end_position: end,
            shelf_width: snapshot.shelf.width(),
        });
    }

    let faces = product.faces();
    if !faces.contains(candidate.face_count()) {
        violations.push(Violation::FaceCountOutOfRange {
            face_count: candidate.face_count(),
            min: faces.min,
            max: faces.max,
        });
    }

    let span = candidate.span();
    for other in snapshot.siblings.iter().filter(|p| {
        p.is_active()
            && p.segment_id() == candidate.segment_id()
            && Some(p.id_typed()) != exclude
    }) {
        let theirs = other.span();
        if spans_overlap(span, theirs) {
            violations.push(Violation::OverlapDetected {
                placement_id: other.id_typed(),
                start: theirs.start,
                end: theirs.end,
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// A segment may not shrink below its tallest occupant.
pub fn check_segment_height(
    requested_height: f64,
    occupant_heights: impl IntoIterator<Item = f64>,
) -> Result<(), Violation> {
    let tallest = occupant_heights.into_iter().fold(None, |acc: Option<f64>, h| {
        Some(acc.map_or(h, |m| m.max(h)))
    });

    match tallest {
        Some(tallest_product) if requested_height < tallest_product => {
            Err(Violation::SegmentTooSmallForExisting {
                requested_height,
                tallest_product,
            })
        }
        _ => Ok(()),
    }
}
