//! Read-side queries over committed layout state.
//!
//! Nothing here writes. Listings only return active rows.

use serde::{Deserialize, Serialize};

use shelfplan_core::{Entity, PlacementId, ProductId, SegmentId, ShelfId, UserId};
use shelfplan_products::Product;
use shelfplan_shelves::{
    LayoutSnapshot, Placement, PlacementGeometry, Segment, SegmentUsage, Shelf, segment_usage,
    validate,
};

use crate::error::LayoutError;
use crate::lookup;
use crate::store::LayoutStore;

/// Geometry a placement would have, returned by a successful dry run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementPreview {
    pub occupied_width: f64,
    pub end_position: f64,
    /// Shelf width left over after the existing placements and this one.
    pub available_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfSummary {
    pub shelf: Shelf,
    /// Sum of the active segments' heights.
    pub total_height: f64,
    pub segment_count: usize,
    pub total_placements: usize,
    pub total_faces: u32,
    /// Active placements of products made by the own company.
    pub own_placements: usize,
    pub competitor_placements: usize,
    /// Mean segment utilization in percent (0 without segments).
    pub average_utilization: f64,
    pub segments: Vec<SegmentUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPlacementStats {
    pub product_id: ProductId,
    pub placement_count: usize,
    pub total_faces: u32,
    /// Distinct shelves the product appears on.
    pub shelf_count: usize,
    pub average_faces: f64,
}

#[derive(Debug, Clone)]
pub struct LayoutQueries<S> {
    store: S,
}

impl<S> LayoutQueries<S>
where
    S: LayoutStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn shelf(&self, shelf_id: ShelfId) -> Result<Shelf, LayoutError> {
        lookup::active_shelf(&self.store, shelf_id)
    }

    pub fn segment(&self, segment_id: SegmentId) -> Result<Segment, LayoutError> {
        lookup::active_segment(&self.store, segment_id)
    }

    pub fn placement(&self, placement_id: PlacementId) -> Result<Placement, LayoutError> {
        lookup::active_placement(&self.store, placement_id)
    }

    /// Any registered product, active or not.
    pub fn product(&self, product_id: ProductId) -> Result<Product, LayoutError> {
        lookup::any_product(&self.store, product_id)
    }

    pub fn list_shelves(&self) -> Result<Vec<Shelf>, LayoutError> {
        let mut shelves: Vec<Shelf> = self
            .store
            .shelves()?
            .into_iter()
            .filter(|s| s.is_active())
            .collect();
        shelves.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(shelves)
    }

    pub fn list_products(&self) -> Result<Vec<Product>, LayoutError> {
        let mut products: Vec<Product> = self
            .store
            .products()?
            .into_iter()
            .filter(|p| p.is_active())
            .collect();
        products.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(products)
    }

    /// Active segments of an active shelf, ordered by level.
    pub fn list_segments(&self, shelf_id: ShelfId) -> Result<Vec<Segment>, LayoutError> {
        lookup::active_shelf(&self.store, shelf_id)?;
        Ok(self
            .store
            .segments_of_shelf(shelf_id)?
            .into_iter()
            .filter(|s| s.is_active())
            .collect())
    }

    /// Active placements of an active segment, ordered by x position.
    pub fn list_placements(&self, segment_id: SegmentId) -> Result<Vec<Placement>, LayoutError> {
        lookup::active_segment(&self.store, segment_id)?;
        let mut placements: Vec<Placement> = self
            .store
            .placements_of_segment(segment_id)?
            .into_iter()
            .filter(|p| p.is_active())
            .collect();
        placements.sort_by(|a, b| a.x_position().total_cmp(&b.x_position()));
        Ok(placements)
    }

    /// Validate a prospective placement without storing anything.
    ///
    /// With `exclude` set the check behaves like a move of that placement.
    pub fn check_placement(
        &self,
        segment_id: SegmentId,
        product_id: ProductId,
        x_position: f64,
        face_count: u32,
        exclude: Option<PlacementId>,
    ) -> Result<PlacementPreview, LayoutError> {
        let segment = lookup::active_segment(&self.store, segment_id)?;
        let shelf = lookup::active_shelf(&self.store, segment.shelf_id())?;
        let product = match exclude {
            Some(_) => lookup::any_product(&self.store, product_id)?,
            None => lookup::active_product(&self.store, product_id)?,
        };

        let candidate = Placement::new(
            exclude.unwrap_or_default(),
            shelf.id_typed(),
            segment_id,
            &product,
            x_position,
            face_count,
            UserId::default(),
            chrono::Utc::now(),
        )?;
        let siblings = self.store.placements_of_segment(segment_id)?;
        let snapshot = LayoutSnapshot {
            shelf: &shelf,
            segment: &segment,
            siblings: &siblings,
        };
        validate(&candidate, &product, &snapshot, exclude).map_err(LayoutError::Violations)?;

        let used: f64 = siblings
            .iter()
            .filter(|p| p.is_active() && Some(p.id_typed()) != exclude)
            .map(|p| p.occupied_width())
            .sum();
        let PlacementGeometry {
            occupied_width,
            end_position,
        } = candidate.geometry();

        Ok(PlacementPreview {
            occupied_width,
            end_position,
            available_width: shelf.width() - used - occupied_width,
        })
    }

    pub fn shelf_summary(&self, shelf_id: ShelfId) -> Result<ShelfSummary, LayoutError> {
        let shelf = lookup::active_shelf(&self.store, shelf_id)?;
        let segments = self.list_segments(shelf_id)?;
        let placements = self.store.placements_of_shelf(shelf_id)?;

        let usage: Vec<SegmentUsage> = segments
            .iter()
            .map(|segment| segment_usage(&shelf, segment, &placements))
            .collect();

        let average_utilization = if usage.is_empty() {
            0.0
        } else {
            usage.iter().map(|u| u.utilization).sum::<f64>() / usage.len() as f64
        };

        let mut own_placements = 0;
        let mut competitor_placements = 0;
        for placement in placements
            .iter()
            .filter(|p| p.is_active() && segments.iter().any(|s| s.id_typed() == p.segment_id()))
        {
            if lookup::any_product(&self.store, placement.product_id())?.is_own_product() {
                own_placements += 1;
            } else {
                competitor_placements += 1;
            }
        }

        Ok(ShelfSummary {
            total_height: segments.iter().map(|s| s.height()).sum(),
            segment_count: segments.len(),
            total_placements: usage.iter().map(|u| u.placement_count).sum(),
            total_faces: usage.iter().map(|u| u.total_faces).sum(),
            own_placements,
            competitor_placements,
            average_utilization,
            segments: usage,
            shelf,
        })
    }

    /// `None` when the product has no active placement.
    pub fn product_placement_stats(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductPlacementStats>, LayoutError> {
        lookup::any_product(&self.store, product_id)?;
        let active: Vec<Placement> = self
            .store
            .placements_of_product(product_id)?
            .into_iter()
            .filter(|p| p.is_active())
            .collect();
        if active.is_empty() {
            return Ok(None);
        }

        let total_faces: u32 = active.iter().map(|p| p.face_count()).sum();
        let mut shelves: Vec<ShelfId> = active.iter().map(|p| p.shelf_id()).collect();
        shelves.sort();
        shelves.dedup();

        Ok(Some(ProductPlacementStats {
            product_id,
            placement_count: active.len(),
            total_faces,
            shelf_count: shelves.len(),
            average_faces: f64::from(total_faces) / active.len() as f64,
        }))
    }

    /// Advisory face count for `product_id` given the width left on a segment.
    pub fn suggest_facing(&self, segment_id: SegmentId, product_id: ProductId) -> Result<u32, LayoutError> {
        let segment = lookup::active_segment(&self.store, segment_id)?;
        let shelf = lookup::active_shelf(&self.store, segment.shelf_id())?;
        let product = lookup::active_product(&self.store, product_id)?;
        let placements = self.store.placements_of_segment(segment_id)?;

        let usage = segment_usage(&shelf, &segment, &placements);
        Ok(product.optimal_facing(usage.available_width))
    }
}
