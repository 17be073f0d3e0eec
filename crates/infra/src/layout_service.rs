//! Layout mutation service (application-level orchestration).
//!
//! Every entry point follows the same pipeline:
//!
//! ```text
//! read scope versions
//!   ↓
//! read the committed rows those scopes cover (referential checks first)
//!   ↓
//! build the candidate state (derived geometry recomputed)
//!   ↓
//! validate (pure)
//!   ↓
//! commit one guarded batch ── conflict ──> re-read and retry (bounded)
//! ```
//!
//! This is the only component allowed to write several rows at once; entity
//! methods just return updated copies. The affected set of each mutation
//! (cascaded deactivations, shifted segment offsets) is computed here and
//! committed in the same batch as the primary change.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use shelfplan_core::{Entity, PlacementId, ProductId, SegmentId, ShelfId, UserId};
use shelfplan_products::{NewProduct, Product};
use shelfplan_shelves::{
    LayoutSnapshot, Placement, Segment, Shelf, ShelfAttrs, check_segment_height,
    sweep_y_positions, validate,
};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::lookup;
use crate::store::{LayoutStore, LayoutWrite, Scope, StoreError};

/// A shelf together with its segments ordered by level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfLayout {
    pub shelf: Shelf,
    pub segments: Vec<Segment>,
}

#[derive(Debug)]
pub struct LayoutMutationService<S> {
    store: S,
    config: LayoutConfig,
}

impl<S> LayoutMutationService<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, LayoutConfig::default())
    }

    pub fn with_config(store: S, config: LayoutConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }
}

impl<S> LayoutMutationService<S>
where
    S: LayoutStore,
{
    /// Place `product_id` on a segment at `x_position` with `face_count` facings.
    #[instrument(skip(self))]
    pub fn place(
        &self,
        shelf_id: ShelfId,
        segment_id: SegmentId,
        product_id: ProductId,
        x_position: f64,
        face_count: u32,
        actor: UserId,
    ) -> Result<Placement, LayoutError> {
        let placement_id = PlacementId::new();

        let placed = self.transact("place", || {
            let segment_version = self.store.version(Scope::Segment(segment_id))?;
            let product_version = self.store.version(Scope::Product(product_id))?;

            let shelf = lookup::active_shelf(&self.store, shelf_id)?;
            let segment = lookup::active_segment(&self.store, segment_id)?;
            let product = lookup::active_product(&self.store, product_id)?;

            let candidate = Placement::new(
                placement_id,
                shelf_id,
                segment_id,
                &product,
                x_position,
                face_count,
                actor,
                Utc::now(),
            )?;
            let siblings = self.store.placements_of_segment(segment_id)?;
            let snapshot = LayoutSnapshot {
                shelf: &shelf,
                segment: &segment,
                siblings: &siblings,
            };
            validate(&candidate, &product, &snapshot, None).map_err(LayoutError::Violations)?;

            let write = LayoutWrite::new()
                .require(Scope::Segment(segment_id), segment_version)
                .require(Scope::Product(product_id), product_version)
                .put_placement(candidate.clone());
            Ok((write, candidate))
        })?;

        info!(
            placement_id = %placed.id_typed(),
            %segment_id,
            occupied_width = placed.occupied_width(),
            end_position = placed.end_position(),
            "placement created"
        );
        Ok(placed)
    }

    /// Move and/or change the face count of an active placement.
    ///
    /// `None` keeps the current value. Re-submitting the current values is a
    /// successful no-op on the stored geometry.
    #[instrument(skip(self))]
    pub fn move_or_resize(
        &self,
        placement_id: PlacementId,
        new_x: Option<f64>,
        new_face_count: Option<u32>,
        actor: UserId,
    ) -> Result<Placement, LayoutError> {
        let updated = self.transact("move_or_resize", || {
            let segment_id = lookup::active_placement(&self.store, placement_id)?.segment_id();
            let segment_version = self.store.version(Scope::Segment(segment_id))?;
            let current = lookup::active_placement(&self.store, placement_id)?;

            let shelf = lookup::active_shelf(&self.store, current.shelf_id())?;
            let segment = lookup::active_segment(&self.store, segment_id)?;
            let product = lookup::any_product(&self.store, current.product_id())?;

            let updated = current.relayout(
                &product,
                new_x.unwrap_or(current.x_position()),
                new_face_count.unwrap_or(current.face_count()),
                actor,
                Utc::now(),
            )?;
            let siblings = self.store.placements_of_segment(segment_id)?;
            let snapshot = LayoutSnapshot {
                shelf: &shelf,
                segment: &segment,
                siblings: &siblings,
            };
            validate(&updated, &product, &snapshot, Some(placement_id))
                .map_err(LayoutError::Violations)?;

            let write = LayoutWrite::new()
                .require(Scope::Segment(segment_id), segment_version)
                .put_placement(updated.clone());
            Ok((write, updated))
        })?;

        info!(
            %placement_id,
            x_position = updated.x_position(),
            face_count = updated.face_count(),
            "placement updated"
        );
        Ok(updated)
    }

    /// Soft-delete a placement.
    #[instrument(skip(self))]
    pub fn remove(&self, placement_id: PlacementId, actor: UserId) -> Result<(), LayoutError> {
        self.transact("remove", || {
            let segment_id = lookup::active_placement(&self.store, placement_id)?.segment_id();
            let segment_version = self.store.version(Scope::Segment(segment_id))?;
            let current = lookup::active_placement(&self.store, placement_id)?;

            let write = LayoutWrite::new()
                .require(Scope::Segment(segment_id), segment_version)
                .put_placement(current.deactivated(actor, Utc::now())?);
            Ok((write, ()))
        })?;

        info!(%placement_id, "placement removed");
        Ok(())
    }

    /// Change a segment's height and shift every segment above it.
    ///
    /// Shrinking below the tallest product currently placed on the segment is
    /// refused; nothing is evicted.
    #[instrument(skip(self))]
    pub fn resize_segment(
        &self,
        segment_id: SegmentId,
        new_height: f64,
        actor: UserId,
    ) -> Result<Segment, LayoutError> {
        let (resized, shifted) = self.transact("resize_segment", || {
            let shelf_id = lookup::active_segment(&self.store, segment_id)?.shelf_id();
            let shelf_version = self.store.version(Scope::Shelf(shelf_id))?;
            let segment_version = self.store.version(Scope::Segment(segment_id))?;

            let current = lookup::active_segment(&self.store, segment_id)?;
            lookup::active_shelf(&self.store, shelf_id)?;
            let resized = current.resized(new_height, actor, Utc::now())?;

            let heights = lookup::occupant_heights(&self.store, segment_id)?;
            check_segment_height(new_height, heights)
                .map_err(|v| LayoutError::Violations(vec![v]))?;

            let mut siblings = self.store.segments_of_shelf(shelf_id)?;
            replace_segment(&mut siblings, resized.clone());
            let (resized, shifted) = split_sweep(sweep_y_positions(&siblings, resized.level()), resized);

            let write = LayoutWrite::new()
                .require(Scope::Shelf(shelf_id), shelf_version)
                .require(Scope::Segment(segment_id), segment_version)
                .put_segment(resized.clone())
                .put_segments(shifted.clone());
            Ok((write, (resized, shifted.len())))
        })?;

        info!(
            %segment_id,
            height = resized.height(),
            shifted_segments = shifted,
            "segment resized"
        );
        Ok(resized)
    }

    /// Create a shelf and its segments (levels 1..=N in the given order) in one batch.
    #[instrument(skip(self, attrs), fields(name = %attrs.name))]
    pub fn create_shelf_with_segments(
        &self,
        attrs: ShelfAttrs,
        segment_heights: &[f64],
        actor: UserId,
    ) -> Result<ShelfLayout, LayoutError> {
        let now = Utc::now();
        let shelf = Shelf::create(ShelfId::new(), attrs, actor, now)?;

        let mut segments = Vec::with_capacity(segment_heights.len());
        for (idx, height) in segment_heights.iter().enumerate() {
            let level = idx as u32 + 1;
            let segment = Segment::new(SegmentId::new(), shelf.id_typed(), level, *height, actor, now)
                .map_err(|e| LayoutError::InvalidRequest(format!("segment level {level}: {e}")))?;
            segments.push(segment);
        }
        for updated in sweep_y_positions(&segments, 1) {
            replace_segment(&mut segments, updated);
        }

        let layout = self.transact("create_shelf_with_segments", || {
            let write = LayoutWrite::new()
                .put_shelf(shelf.clone())
                .put_segments(segments.clone());
            Ok((
                write,
                ShelfLayout {
                    shelf: shelf.clone(),
                    segments: segments.clone(),
                },
            ))
        })?;

        info!(
            shelf_id = %layout.shelf.id_typed(),
            segments = layout.segments.len(),
            "shelf created"
        );
        Ok(layout)
    }

    /// Append a segment on top of the shelf's highest level.
    #[instrument(skip(self))]
    pub fn add_segment(
        &self,
        shelf_id: ShelfId,
        height: f64,
        actor: UserId,
    ) -> Result<Segment, LayoutError> {
        let segment_id = SegmentId::new();

        let added = self.transact("add_segment", || {
            let shelf_version = self.store.version(Scope::Shelf(shelf_id))?;
            lookup::active_shelf(&self.store, shelf_id)?;

            let mut siblings = self.store.segments_of_shelf(shelf_id)?;
            // Levels of inactive segments stay reserved.
            let level = siblings.iter().map(|s| s.level()).max().unwrap_or(0) + 1;
            let segment = Segment::new(segment_id, shelf_id, level, height, actor, Utc::now())?;
            siblings.push(segment.clone());
            let (segment, _) = split_sweep(sweep_y_positions(&siblings, level), segment);

            let write = LayoutWrite::new()
                .require(Scope::Shelf(shelf_id), shelf_version)
                .put_segment(segment.clone());
            Ok((write, segment))
        })?;

        info!(
            %shelf_id,
            %segment_id,
            level = added.level(),
            y_position = added.y_position(),
            "segment added"
        );
        Ok(added)
    }

    /// Soft-delete a segment, cascading to its placements and shifting the levels above.
    #[instrument(skip(self))]
    pub fn deactivate_segment(&self, segment_id: SegmentId, actor: UserId) -> Result<(), LayoutError> {
        let cascaded = self.transact("deactivate_segment", || {
            let shelf_id = lookup::active_segment(&self.store, segment_id)?.shelf_id();
            let shelf_version = self.store.version(Scope::Shelf(shelf_id))?;
            let segment_version = self.store.version(Scope::Segment(segment_id))?;
            let current = lookup::active_segment(&self.store, segment_id)?;

            let now = Utc::now();
            let deactivated = current.deactivated(actor, now)?;
            let placements = deactivate_all(&self.store.placements_of_segment(segment_id)?, actor, now)?;

            let mut siblings = self.store.segments_of_shelf(shelf_id)?;
            replace_segment(&mut siblings, deactivated.clone());
            let shifted = sweep_y_positions(&siblings, deactivated.level());

            let cascaded = placements.len();
            let write = LayoutWrite::new()
                .require(Scope::Shelf(shelf_id), shelf_version)
                .require(Scope::Segment(segment_id), segment_version)
                .put_segment(deactivated)
                .put_segments(shifted)
                .put_placements(placements);
            Ok((write, cascaded))
        })?;

        info!(%segment_id, cascaded_placements = cascaded, "segment deactivated");
        Ok(())
    }

    /// Soft-delete a shelf together with all of its segments and placements.
    #[instrument(skip(self))]
    pub fn deactivate_shelf(&self, shelf_id: ShelfId, actor: UserId) -> Result<(), LayoutError> {
        let (segments, placements) = self.transact("deactivate_shelf", || {
            let shelf_version = self.store.version(Scope::Shelf(shelf_id))?;
            let shelf = lookup::active_shelf(&self.store, shelf_id)?;
            let now = Utc::now();

            let mut write = LayoutWrite::new()
                .require(Scope::Shelf(shelf_id), shelf_version)
                .put_shelf(shelf.deactivated(actor, now)?);

            let mut counts = (0, 0);
            for segment in self
                .store
                .segments_of_shelf(shelf_id)?
                .into_iter()
                .filter(|s| s.is_active())
            {
                let segment_id = segment.id_typed();
                let segment_version = self.store.version(Scope::Segment(segment_id))?;
                let placements =
                    deactivate_all(&self.store.placements_of_segment(segment_id)?, actor, now)?;
                counts.0 += 1;
                counts.1 += placements.len();
                write = write
                    .require(Scope::Segment(segment_id), segment_version)
                    .put_segment(segment.deactivated(actor, now)?)
                    .put_placements(placements);
            }
            Ok((write, counts))
        })?;

        info!(
            %shelf_id,
            cascaded_segments = segments,
            cascaded_placements = placements,
            "shelf deactivated"
        );
        Ok(())
    }

    /// Add a product to the registry. An active product's JAN code must be unique.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn register_product(&self, new: NewProduct, actor: UserId) -> Result<Product, LayoutError> {
        let product_id = ProductId::new();

        let product = self.transact("register_product", || {
            let catalog_version = self.store.version(Scope::Catalog)?;
            let product = Product::register(product_id, new.clone(), actor, Utc::now())?;

            if let Some(code) = product.jan_code() {
                let taken = self
                    .store
                    .products()?
                    .iter()
                    .any(|p| p.is_active() && p.jan_code() == Some(code));
                if taken {
                    return Err(LayoutError::InvalidRequest(format!(
                        "jan_code {code} is already in use"
                    )));
                }
            }

            let write = LayoutWrite::new()
                .require(Scope::Catalog, catalog_version)
                .put_product(product.clone());
            Ok((write, product))
        })?;

        info!(%product_id, "product registered");
        Ok(product)
    }

    /// Soft-delete a product. Existing placements are kept as they are.
    #[instrument(skip(self))]
    pub fn deactivate_product(&self, product_id: ProductId, actor: UserId) -> Result<Product, LayoutError> {
        let product = self.transact("deactivate_product", || {
            let product_version = self.store.version(Scope::Product(product_id))?;
            let product = lookup::active_product(&self.store, product_id)?.deactivated(actor, Utc::now())?;

            let write = LayoutWrite::new()
                .require(Scope::Product(product_id), product_version)
                .put_product(product.clone());
            Ok((write, product))
        })?;

        info!(%product_id, "product deactivated");
        Ok(product)
    }

    /// Hard-delete a product. Refused while any active placement uses it;
    /// inactive placements of the product are purged with it.
    #[instrument(skip(self))]
    pub fn delete_product(&self, product_id: ProductId, actor: UserId) -> Result<(), LayoutError> {
        let purged = self.transact("delete_product", || {
            let product_version = self.store.version(Scope::Product(product_id))?;
            lookup::any_product(&self.store, product_id)?;

            let placements = self.store.placements_of_product(product_id)?;
            if placements.iter().any(|p| p.is_active()) {
                return Err(LayoutError::ProductInUse(product_id));
            }
            let purged: Vec<PlacementId> = placements.iter().map(|p| p.id_typed()).collect();

            let count = purged.len();
            let write = LayoutWrite::new()
                .require(Scope::Product(product_id), product_version)
                .remove_product(product_id)
                .remove_placements(purged);
            Ok((write, count))
        })?;

        info!(%product_id, %actor, purged_placements = purged, "product deleted");
        Ok(())
    }

    /// Run `attempt` and commit its write, re-running it after a conflict
    /// until `max_commit_attempts` is exhausted.
    fn transact<T>(
        &self,
        operation: &'static str,
        mut attempt: impl FnMut() -> Result<(LayoutWrite, T), LayoutError>,
    ) -> Result<T, LayoutError> {
        let max_attempts = self.config.max_commit_attempts.max(1);
        let mut tries = 0;

        loop {
            tries += 1;
            let (write, output) = attempt().inspect_err(|e| {
                debug!(operation, error = %e, "mutation rejected");
            })?;

            match self.store.commit(write) {
                Ok(()) => return Ok(output),
                Err(StoreError::Conflict(reason)) if tries < max_attempts => {
                    warn!(operation, attempt = tries, %reason, "commit conflict; retrying");
                }
                Err(StoreError::Conflict(reason)) => {
                    warn!(operation, attempts = tries, %reason, "commit conflict; giving up");
                    return Err(LayoutError::Transient(reason));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn replace_segment(segments: &mut Vec<Segment>, updated: Segment) {
    match segments.iter_mut().find(|s| s.id_typed() == updated.id_typed()) {
        Some(slot) => *slot = updated,
        None => segments.push(updated),
    }
}

/// Separate the sweep result for `primary` (if its offset moved) from the
/// segments above it.
fn split_sweep(shifted: Vec<Segment>, primary: Segment) -> (Segment, Vec<Segment>) {
    let mut primary = primary;
    let mut others = Vec::with_capacity(shifted.len());
    for segment in shifted {
        if segment.id_typed() == primary.id_typed() {
            primary = segment;
        } else {
            others.push(segment);
        }
    }
    (primary, others)
}

fn deactivate_all(
    placements: &[Placement],
    actor: UserId,
    now: chrono::DateTime<Utc>,
) -> Result<Vec<Placement>, LayoutError> {
    placements
        .iter()
        .filter(|p| p.is_active())
        .map(|p| p.deactivated(actor, now).map_err(LayoutError::from))
        .collect()
}
