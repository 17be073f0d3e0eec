use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard};

use shelfplan_core::{PlacementId, ProductId, SegmentId, ShelfId};
use shelfplan_products::Product;
use shelfplan_shelves::{Placement, Segment, Shelf};

use super::r#trait::{LayoutStore, LayoutWrite, Scope, StoreError};

#[derive(Debug, Default)]
struct Tables {
    shelves: HashMap<ShelfId, Shelf>,
    segments: HashMap<SegmentId, Segment>,
    placements: HashMap<PlacementId, Placement>,
    products: HashMap<ProductId, Product>,
    versions: HashMap<Scope, u64>,
}

/// In-memory layout store.
///
/// Intended for tests/dev. A single `RwLock` makes every commit serializable;
/// per-scope versions give optimistic isolation between a mutation's reads
/// and its commit.
#[derive(Debug, Default)]
pub struct InMemoryLayoutStore {
    tables: RwLock<Tables>,
}

impl InMemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))
    }
}

impl LayoutStore for InMemoryLayoutStore {
    fn shelf(&self, id: ShelfId) -> Result<Option<Shelf>, StoreError> {
        Ok(self.read()?.shelves.get(&id).cloned())
    }

    fn segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError> {
        Ok(self.read()?.segments.get(&id).cloned())
    }

    fn placement(&self, id: PlacementId) -> Result<Option<Placement>, StoreError> {
        Ok(self.read()?.placements.get(&id).cloned())
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn shelves(&self) -> Result<Vec<Shelf>, StoreError> {
        let mut shelves: Vec<Shelf> = self.read()?.shelves.values().cloned().collect();
        shelves.sort_by(|a, b| a.name().cmp(b.name()).then(a.id_typed().cmp(&b.id_typed())));
        Ok(shelves)
    }

    fn products(&self) -> Result<Vec<Product>, StoreError> {
        let mut products: Vec<Product> = self.read()?.products.values().cloned().collect();
        products.sort_by(|a, b| a.name().cmp(b.name()).then(a.id_typed().cmp(&b.id_typed())));
        Ok(products)
    }

    fn segments_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Segment>, StoreError> {
        let mut segments: Vec<Segment> = self
            .read()?
            .segments
            .values()
            .filter(|s| s.shelf_id() == shelf_id)
            .cloned()
            .collect();
        segments.sort_by_key(|s| s.level());
        Ok(segments)
    }

    fn placements_of_segment(&self, segment_id: SegmentId) -> Result<Vec<Placement>, StoreError> {
        let tables = self.read()?;
        Ok(sorted_by_x(
            tables.placements.values().filter(|p| p.segment_id() == segment_id),
        ))
    }

    fn placements_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Placement>, StoreError> {
        let tables = self.read()?;
        Ok(sorted_by_x(
            tables.placements.values().filter(|p| p.shelf_id() == shelf_id),
        ))
    }

    fn placements_of_product(&self, product_id: ProductId) -> Result<Vec<Placement>, StoreError> {
        let tables = self.read()?;
        Ok(sorted_by_x(
            tables.placements.values().filter(|p| p.product_id() == product_id),
        ))
    }

    fn version(&self, scope: Scope) -> Result<u64, StoreError> {
        Ok(self.read()?.versions.get(&scope).copied().unwrap_or(0))
    }

    fn commit(&self, write: LayoutWrite) -> Result<(), StoreError> {
        if write.is_empty() {
            return Ok(());
        }

        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        for guard in &write.guards {
            let current = tables.versions.get(&guard.scope).copied().unwrap_or(0);
            if !guard.expected.matches(current) {
                return Err(StoreError::Conflict(format!(
                    "{:?} expected {:?}, found {current}",
                    guard.scope, guard.expected
                )));
            }
        }

        check_references(&tables, &write)?;

        // Everything below is infallible: the batch lands in full.
        let scopes = write.touched_scopes();
        for shelf in write.shelves {
            tables.shelves.insert(shelf.id_typed(), shelf);
        }
        for segment in write.segments {
            tables.segments.insert(segment.id_typed(), segment);
        }
        for placement in write.placements {
            tables.placements.insert(placement.id_typed(), placement);
        }
        for product in write.products {
            tables.products.insert(product.id_typed(), product);
        }
        for id in write.removed_placements {
            tables.placements.remove(&id);
        }
        for id in write.removed_products {
            tables.products.remove(&id);
        }
        for scope in scopes {
            *tables.versions.entry(scope).or_insert(0) += 1;
        }

        Ok(())
    }
}

fn sorted_by_x<'a>(placements: impl Iterator<Item = &'a Placement>) -> Vec<Placement> {
    let mut out: Vec<Placement> = placements.cloned().collect();
    out.sort_by(|a, b| a.x_position().total_cmp(&b.x_position()));
    out
}

/// Referential checks over the state the batch would produce.
fn check_references(tables: &Tables, write: &LayoutWrite) -> Result<(), StoreError> {
    let shelf_exists = |id: ShelfId| {
        tables.shelves.contains_key(&id) || write.shelves.iter().any(|s| s.id_typed() == id)
    };
    let segment_of = |id: SegmentId| {
        write
            .segments
            .iter()
            .find(|s| s.id_typed() == id)
            .or_else(|| tables.segments.get(&id))
    };
    let removed_products: HashSet<ProductId> = write.removed_products.iter().copied().collect();
    let product_exists = |id: ProductId| {
        !removed_products.contains(&id)
            && (tables.products.contains_key(&id)
                || write.products.iter().any(|p| p.id_typed() == id))
    };

    for segment in &write.segments {
        if !shelf_exists(segment.shelf_id()) {
            return Err(StoreError::Integrity(format!(
                "segment {} references unknown shelf {}",
                segment.id_typed(),
                segment.shelf_id()
            )));
        }
    }

    // Levels stay unique per shelf.
    let touched_shelves: HashSet<ShelfId> = write.segments.iter().map(|s| s.shelf_id()).collect();
    for shelf_id in touched_shelves {
        let mut levels = HashSet::new();
        let written: HashSet<SegmentId> = write.segments.iter().map(|s| s.id_typed()).collect();
        let after = write
            .segments
            .iter()
            .filter(|s| s.shelf_id() == shelf_id)
            .chain(
                tables
                    .segments
                    .values()
                    .filter(|s| s.shelf_id() == shelf_id && !written.contains(&s.id_typed())),
            );
        for segment in after {
            if !levels.insert(segment.level()) {
                return Err(StoreError::Integrity(format!(
                    "duplicate level {} on shelf {shelf_id}",
                    segment.level()
                )));
            }
        }
    }

    for placement in &write.placements {
        match segment_of(placement.segment_id()) {
            Some(segment) if segment.shelf_id() == placement.shelf_id() => {}
            Some(_) => {
                return Err(StoreError::Integrity(format!(
                    "placement {} names a segment of another shelf",
                    placement.id_typed()
                )));
            }
            None => {
                return Err(StoreError::Integrity(format!(
                    "placement {} references unknown segment {}",
                    placement.id_typed(),
                    placement.segment_id()
                )));
            }
        }
        if !product_exists(placement.product_id()) {
            // Either a bug or a product deleted under our feet; re-reading tells which.
            return Err(StoreError::Conflict(format!(
                "placement {} references missing product {}",
                placement.id_typed(),
                placement.product_id()
            )));
        }
    }

    // Protect-on-delete: no surviving placement may reference a removed product.
    if !removed_products.is_empty() {
        let purged: HashSet<PlacementId> = write.removed_placements.iter().copied().collect();
        let written: HashSet<PlacementId> = write.placements.iter().map(|p| p.id_typed()).collect();
        let survivors = write.placements.iter().chain(
            tables
                .placements
                .values()
                .filter(|p| !written.contains(&p.id_typed())),
        );
        for placement in survivors {
            if removed_products.contains(&placement.product_id())
                && !purged.contains(&placement.id_typed())
            {
                return Err(StoreError::Conflict(format!(
                    "product {} is still referenced by placement {}",
                    placement.product_id(),
                    placement.id_typed()
                )));
            }
        }
    }

    Ok(())
}
