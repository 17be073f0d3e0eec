//! Errors raised while building or changing shelves, segments, products and
//! placements.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a single shelf-domain write was refused.
///
/// Placement fit checks (height, width, faces, overlap) do not use this
/// type: they collect every `Violation` in `shelfplan-shelves` and are
/// reported together.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Bad input on a shelf, segment or product: a dimension outside
    /// `(0, 1000]` cm, inverted face bounds, an overlong JAN code or a blank
    /// name.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Entities that should belong together do not, e.g. a placement built
    /// from a product other than the one it references.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A shelf, segment, product or placement id that does not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Lifecycle or version clash: deactivating an already inactive entity,
    /// or a scope version that moved on since it was read.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
