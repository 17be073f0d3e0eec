//! Shelf layout domain: shelves, segments, placements and the rules that
//! govern where a product may sit.
//!
//! Everything here is deterministic and side-effect free. Entity "write"
//! methods return updated copies; deciding which rows change together (and
//! persisting them) belongs to the mutation service in `shelfplan-infra`.

pub mod constraints;
pub mod geometry;
pub mod placement;
pub mod segment;
pub mod shelf;
pub mod stats;

pub use constraints::{LayoutSnapshot, Violation, check_segment_height, validate};
pub use geometry::{PlacementGeometry, Span, recompute_y_position, spans_overlap, sweep_y_positions};
pub use placement::Placement;
pub use segment::Segment;
pub use shelf::{Shelf, ShelfAttrs};
pub use stats::{SegmentUsage, segment_usage};
