//! Entity trait, soft-delete lifecycle and audit stamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

/// Entity marker + minimal interface.
///
/// Every layout entity is soft-deleted: it keeps its identity after
/// deactivation, but only active entities take part in geometry and
/// constraint calculations.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Current lifecycle state.
    fn lifecycle(&self) -> Lifecycle;

    fn is_active(&self) -> bool {
        self.lifecycle().is_active()
    }
}

/// Soft-delete state machine shared by shelves, segments, placements and products.
///
/// The only transition is `Active -> Inactive`. Cascading (shelf to segments to
/// placements) is decided by the caller that owns the affected set, never by
/// the entity itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    #[default]
    Active,
    Inactive,
}

impl Lifecycle {
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }

    /// Returns the state after deactivation.
    pub fn deactivate(self) -> DomainResult<Lifecycle> {
        match self {
            Lifecycle::Active => Ok(Lifecycle::Inactive),
            Lifecycle::Inactive => Err(DomainError::conflict("already inactive")),
        }
    }
}

/// Who created/last touched an entity, and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub updated_at: DateTime<Utc>,
    pub updated_by: UserId,
}

impl AuditStamp {
    pub fn new(actor: UserId, now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            created_by: actor,
            updated_at: now,
            updated_by: actor,
        }
    }

    /// Record a modification, keeping the creation fields intact.
    pub fn touched(self, actor: UserId, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            updated_by: actor,
            ..self
        }
    }
}
