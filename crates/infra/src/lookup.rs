//! Referential lookups shared by the services.
//!
//! Inactive rows are reported as not found: a request may not target
//! something that has been soft-deleted.

use shelfplan_core::{Entity, PlacementId, ProductId, SegmentId, ShelfId};
use shelfplan_products::Product;
use shelfplan_shelves::{Placement, Segment, Shelf};

use crate::error::{EntityRef, LayoutError};
use crate::store::LayoutStore;

pub(crate) fn active_shelf<S>(store: &S, id: ShelfId) -> Result<Shelf, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    store
        .shelf(id)?
        .filter(|s| s.is_active())
        .ok_or(LayoutError::NotFound(EntityRef::Shelf(id)))
}

pub(crate) fn active_segment<S>(store: &S, id: SegmentId) -> Result<Segment, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    store
        .segment(id)?
        .filter(|s| s.is_active())
        .ok_or(LayoutError::NotFound(EntityRef::Segment(id)))
}

pub(crate) fn active_placement<S>(store: &S, id: PlacementId) -> Result<Placement, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    store
        .placement(id)?
        .filter(|p| p.is_active())
        .ok_or(LayoutError::NotFound(EntityRef::Placement(id)))
}

/// Products that may be newly placed.
pub(crate) fn active_product<S>(store: &S, id: ProductId) -> Result<Product, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    store
        .product(id)?
        .filter(|p| p.is_active())
        .ok_or(LayoutError::NotFound(EntityRef::Product(id)))
}

/// Products referenced by existing placements; deactivation does not hide them.
pub(crate) fn any_product<S>(store: &S, id: ProductId) -> Result<Product, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    store
        .product(id)?
        .ok_or(LayoutError::NotFound(EntityRef::Product(id)))
}

/// Heights of the products currently placed (active) in `segment_id`.
pub(crate) fn occupant_heights<S>(store: &S, segment_id: SegmentId) -> Result<Vec<f64>, LayoutError>
where
    S: LayoutStore + ?Sized,
{
    let mut heights = Vec::new();
    for placement in store
        .placements_of_segment(segment_id)?
        .iter()
        .filter(|p| p.is_active())
    {
        heights.push(any_product(store, placement.product_id())?.height());
    }
    Ok(heights)
}
