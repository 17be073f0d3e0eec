use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfplan_core::{
    AuditStamp, DomainError, DomainResult, Entity, Lifecycle, ShelfId, UserId, validate_dimension,
};

/// Attributes supplied when a shelf is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfAttrs {
    pub name: String,
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
}

/// A physical fixture. Width and depth are fixed once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    id: ShelfId,
    name: String,
    width: f64,
    depth: f64,
    location: String,
    description: String,
    lifecycle: Lifecycle,
    audit: AuditStamp,
}

impl Shelf {
    pub fn create(
        id: ShelfId,
        attrs: ShelfAttrs,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if attrs.name.trim().is_empty() {
            return Err(DomainError::validation("shelf name cannot be empty"));
        }
        validate_dimension("width", attrs.width)?;
        validate_dimension("depth", attrs.depth)?;

        Ok(Self {
            id,
            name: attrs.name.trim().to_string(),
            width: attrs.width,
            depth: attrs.depth,
            location: attrs.location,
            description: attrs.description,
            lifecycle: Lifecycle::Active,
            audit: AuditStamp::new(actor, now),
        })
    }

    pub fn id_typed(&self) -> ShelfId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn audit(&self) -> AuditStamp {
        self.audit
    }

    /// Returns the deactivated copy. Segments and placements are cascaded by the caller.
    pub fn deactivated(&self, actor: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            lifecycle: self.lifecycle.deactivate()?,
            audit: self.audit.touched(actor, now),
            ..self.clone()
        })
    }
}

impl Entity for Shelf {
    type Id = ShelfId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}
