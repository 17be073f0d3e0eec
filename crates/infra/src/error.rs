//! Failure set of the layout services.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shelfplan_core::{DomainError, PlacementId, ProductId, SegmentId, ShelfId};
use shelfplan_shelves::Violation;

use crate::store::StoreError;

/// Reference to an entity a request named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Shelf(ShelfId),
    Segment(SegmentId),
    Placement(PlacementId),
    Product(ProductId),
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityRef::Shelf(id) => write!(f, "shelf {id}"),
            EntityRef::Segment(id) => write!(f, "segment {id}"),
            EntityRef::Placement(id) => write!(f, "placement {id}"),
            EntityRef::Product(id) => write!(f, "product {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The proposed layout breaks one or more rules. Caller-correctable.
    #[error("layout rejected: {}", summarize(.0))]
    Violations(Vec<Violation>),

    /// The request named an unknown or inactive entity.
    #[error("{0} not found")]
    NotFound(EntityRef),

    /// The request was malformed (bad dimension, duplicate code, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Hard delete refused while active placements reference the product.
    #[error("product {0} is used by active placements")]
    ProductInUse(ProductId),

    /// Concurrent writes kept conflicting; retrying later may succeed.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Storage or consistency failure unrelated to the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LayoutError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            LayoutError::Violations(v) => v,
            _ => &[],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::code)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<StoreError> for LayoutError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => LayoutError::Transient(msg),
            StoreError::Unavailable(msg) => LayoutError::Internal(msg),
            StoreError::Integrity(msg) => LayoutError::Internal(msg),
        }
    }
}

impl From<DomainError> for LayoutError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => LayoutError::InvalidRequest(msg),
            DomainError::InvalidId(msg) => LayoutError::InvalidRequest(msg),
            DomainError::Conflict(msg) => LayoutError::InvalidRequest(msg),
            DomainError::InvariantViolation(msg) => LayoutError::Internal(msg),
        }
    }
}
