//! `shelfplan-core` — shared building blocks for the shelf layout engine.
//!
//! This crate contains **pure domain** primitives (no storage, no IO): typed
//! identifiers, the domain error model, entity lifecycle, and the physical
//! measurement policy shared by products and shelves.

pub mod entity;
pub mod error;
pub mod id;
pub mod measure;
pub mod value_object;
pub mod version;

pub use entity::{AuditStamp, Entity, Lifecycle};
pub use error::{DomainError, DomainResult};
pub use id::{PlacementId, ProductId, SegmentId, ShelfId, UserId};
pub use measure::{
    MAX_DIMENSION_CM, MAX_FACE_COUNT, MIN_FACE_COUNT, validate_dimension, validate_face_count,
    validate_level,
};
pub use value_object::ValueObject;
pub use version::ExpectedVersion;
