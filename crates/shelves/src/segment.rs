use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfplan_core::{
    AuditStamp, DomainResult, Entity, Lifecycle, SegmentId, ShelfId, UserId, validate_dimension,
    validate_level,
};

/// One horizontal level of a shelf.
///
/// `y_position` is derived from the heights of the active segments below and
/// can only be assigned by [`crate::geometry::sweep_y_positions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    id: SegmentId,
    shelf_id: ShelfId,
    level: u32,
    height: f64,
    y_position: f64,
    lifecycle: Lifecycle,
    audit: AuditStamp,
}

impl Segment {
    /// Build a new active segment. Its `y_position` starts at 0 until swept.
    pub fn new(
        id: SegmentId,
        shelf_id: ShelfId,
        level: u32,
        height: f64,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        validate_level(level)?;
        validate_dimension("height", height)?;

        Ok(Self {
            id,
            shelf_id,
            level,
            height,
            y_position: 0.0,
            lifecycle: Lifecycle::Active,
            audit: AuditStamp::new(actor, now),
        })
    }

    pub fn id_typed(&self) -> SegmentId {
        self.id
    }

    pub fn shelf_id(&self) -> ShelfId {
        self.shelf_id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn y_position(&self) -> f64 {
        self.y_position
    }

    pub fn audit(&self) -> AuditStamp {
        self.audit
    }

    /// Top edge measured from the shelf floor.
    pub fn top(&self) -> f64 {
        self.y_position + self.height
    }

    /// Returns a copy with a new height. Occupant checks and the geometry
    /// sweep are the caller's job.
    pub fn resized(&self, height: f64, actor: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        validate_dimension("height", height)?;
        Ok(Self {
            height,
            audit: self.audit.touched(actor, now),
            ..self.clone()
        })
    }

    pub fn deactivated(&self, actor: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            lifecycle: self.lifecycle.deactivate()?,
            audit: self.audit.touched(actor, now),
            ..self.clone()
        })
    }

    pub(crate) fn with_y_position(&self, y_position: f64) -> Self {
        Self {
            y_position,
            ..self.clone()
        }
    }
}

impl Entity for Segment {
    type Id = SegmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}
