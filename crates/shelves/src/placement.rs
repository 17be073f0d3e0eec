use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfplan_core::{
    AuditStamp, DomainError, DomainResult, Entity, Lifecycle, PlacementId, ProductId, SegmentId,
    ShelfId, UserId,
};
use shelfplan_products::Product;

use crate::geometry::{PlacementGeometry, Span};

/// A product occupying a horizontal span of one segment.
///
/// `occupied_width` is stored next to its inputs and is rewritten by every
/// constructor that touches `x_position`, `face_count` or the product, so it
/// can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    id: PlacementId,
    shelf_id: ShelfId,
    segment_id: SegmentId,
    product_id: ProductId,
    x_position: f64,
    face_count: u32,
    occupied_width: f64,
    lifecycle: Lifecycle,
    audit: AuditStamp,
}

impl Placement {
    /// Build a candidate placement with freshly computed geometry.
    ///
    /// Only the shape of the input is checked here; layout rules are the
    /// validator's job.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PlacementId,
        shelf_id: ShelfId,
        segment_id: SegmentId,
        product: &Product,
        x_position: f64,
        face_count: u32,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        ensure_finite(x_position)?;
        let geometry = PlacementGeometry::compute(x_position, product.width(), face_count);

        Ok(Self {
            id,
            shelf_id,
            segment_id,
            product_id: product.id_typed(),
            x_position,
            face_count,
            occupied_width: geometry.occupied_width,
            lifecycle: Lifecycle::Active,
            audit: AuditStamp::new(actor, now),
        })
    }

    /// Returns a copy moved and/or resized, with geometry recomputed from `product`.
    pub fn relayout(
        &self,
        product: &Product,
        x_position: f64,
        face_count: u32,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if product.id_typed() != self.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }
        ensure_finite(x_position)?;
        let geometry = PlacementGeometry::compute(x_position, product.width(), face_count);

        Ok(Self {
            x_position,
            face_count,
            occupied_width: geometry.occupied_width,
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

    pub fn id_typed(&self) -> PlacementId {
        self.id
    }

    pub fn shelf_id(&self) -> ShelfId {
        self.shelf_id
    }

    pub fn segment_id(&self) -> SegmentId {
        self.segment_id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn x_position(&self) -> f64 {
        self.x_position
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn occupied_width(&self) -> f64 {
        self.occupied_width
    }

    pub fn end_position(&self) -> f64 {
        self.x_position + self.occupied_width
    }

    pub fn audit(&self) -> AuditStamp {
        self.audit
    }

    pub fn geometry(&self) -> PlacementGeometry {
        PlacementGeometry {
            occupied_width: self.occupied_width,
            end_position: self.end_position(),
        }
    }

    /// Half-open horizontal extent `[x_position, end_position)`.
    pub fn span(&self) -> Span {
        Span::new(self.x_position, self.end_position())
    }
}

impl Entity for Placement {
    type Id = PlacementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

fn ensure_finite(x_position: f64) -> DomainResult<()> {
    if !x_position.is_finite() {
        return Err(DomainError::validation("x_position must be a finite number"));
    }
    Ok(())
}
