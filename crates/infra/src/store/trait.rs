use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

use shelfplan_core::{ExpectedVersion, PlacementId, ProductId, SegmentId, ShelfId};
use shelfplan_products::Product;
use shelfplan_shelves::{Placement, Segment, Shelf};

/// Unit of isolation.
///
/// Every commit bumps the version of each scope it writes to. A mutation
/// records the versions of the scopes it read and the store refuses the
/// commit if any of them moved in the meantime.
///
/// - `Segment(id)`: the segment row and every placement in it.
/// - `Shelf(id)`: the shelf row and the set/heights of its segments.
/// - `Product(id)`: the product row.
/// - `Catalog`: the set of products (uniqueness checks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Shelf(ShelfId),
    Segment(SegmentId),
    Product(ProductId),
    Catalog,
}

/// A version expectation attached to a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guard {
    pub scope: Scope,
    pub expected: ExpectedVersion,
}

/// One atomic batch of upserts/removals.
#[derive(Debug, Clone, Default)]
pub struct LayoutWrite {
    pub guards: Vec<Guard>,
    pub shelves: Vec<Shelf>,
    pub segments: Vec<Segment>,
    pub placements: Vec<Placement>,
    pub products: Vec<Product>,
    /// Hard-deleted products.
    pub removed_products: Vec<ProductId>,
    /// Hard-deleted placements (only ever inactive ones, purged with their product).
    pub removed_placements: Vec<PlacementId>,
}

impl LayoutWrite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `scope` to still be at `version` when committing.
    pub fn require(mut self, scope: Scope, version: u64) -> Self {
        self.guards.push(Guard {
            scope,
            expected: ExpectedVersion::Exact(version),
        });
        self
    }

    pub fn put_shelf(mut self, shelf: Shelf) -> Self {
        self.shelves.push(shelf);
        self
    }

    pub fn put_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn put_segments(mut self, segments: impl IntoIterator<Item = Segment>) -> Self {
        self.segments.extend(segments);
        self
    }

    pub fn put_placement(mut self, placement: Placement) -> Self {
        self.placements.push(placement);
        self
    }

    pub fn put_placements(mut self, placements: impl IntoIterator<Item = Placement>) -> Self {
        self.placements.extend(placements);
        self
    }

    pub fn put_product(mut self, product: Product) -> Self {
        self.products.push(product);
        self
    }

    pub fn remove_product(mut self, id: ProductId) -> Self {
        self.removed_products.push(id);
        self
    }

    pub fn remove_placements(mut self, ids: impl IntoIterator<Item = PlacementId>) -> Self {
        self.removed_placements.extend(ids);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
            && self.segments.is_empty()
            && self.placements.is_empty()
            && self.products.is_empty()
            && self.removed_products.is_empty()
            && self.removed_placements.is_empty()
    }

    /// Scopes whose version this write bumps.
    pub fn touched_scopes(&self) -> HashSet<Scope> {
        let mut scopes = HashSet::new();
        for shelf in &self.shelves {
            scopes.insert(Scope::Shelf(shelf.id_typed()));
        }
        for segment in &self.segments {
            scopes.insert(Scope::Segment(segment.id_typed()));
            scopes.insert(Scope::Shelf(segment.shelf_id()));
        }
        for placement in &self.placements {
            scopes.insert(Scope::Segment(placement.segment_id()));
        }
        for product in &self.products {
            scopes.insert(Scope::Product(product.id_typed()));
            scopes.insert(Scope::Catalog);
        }
        for id in &self.removed_products {
            scopes.insert(Scope::Product(*id));
            scopes.insert(Scope::Catalog);
        }
        scopes
    }
}

/// Storage failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A guarded scope changed since it was read, or a concurrent write broke
    /// a referential rule. Safe to retry after re-reading.
    #[error("concurrent write conflict: {0}")]
    Conflict(String),

    /// The backend cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The batch would leave the store inconsistent (dangling reference,
    /// duplicate level). Indicates a bug in the caller, not a race.
    #[error("integrity violation: {0}")]
    Integrity(String),
}

/// Persistence boundary used by the layout services.
///
/// Collection reads return inactive rows too; callers filter by lifecycle.
pub trait LayoutStore: Send + Sync {
    fn shelf(&self, id: ShelfId) -> Result<Option<Shelf>, StoreError>;
    fn segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError>;
    fn placement(&self, id: PlacementId) -> Result<Option<Placement>, StoreError>;
    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    fn shelves(&self) -> Result<Vec<Shelf>, StoreError>;
    fn products(&self) -> Result<Vec<Product>, StoreError>;

    /// Segments of a shelf ordered by level.
    fn segments_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Segment>, StoreError>;
    /// Placements of a segment ordered by `x_position`.
    fn placements_of_segment(&self, segment_id: SegmentId) -> Result<Vec<Placement>, StoreError>;
    fn placements_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Placement>, StoreError>;
    fn placements_of_product(&self, product_id: ProductId) -> Result<Vec<Placement>, StoreError>;

    /// Current version of `scope` (0 if never written).
    fn version(&self, scope: Scope) -> Result<u64, StoreError>;

    /// Apply `write` atomically: every guard must match and the result must be
    /// referentially consistent, otherwise nothing is written.
    fn commit(&self, write: LayoutWrite) -> Result<(), StoreError>;
}

impl<S> LayoutStore for Arc<S>
where
    S: LayoutStore + ?Sized,
{
    fn shelf(&self, id: ShelfId) -> Result<Option<Shelf>, StoreError> {
        (**self).shelf(id)
    }

    fn segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError> {
        (**self).segment(id)
    }

    fn placement(&self, id: PlacementId) -> Result<Option<Placement>, StoreError> {
        (**self).placement(id)
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).product(id)
    }

    fn shelves(&self) -> Result<Vec<Shelf>, StoreError> {
        (**self).shelves()
    }

    fn products(&self) -> Result<Vec<Product>, StoreError> {
        (**self).products()
    }

    fn segments_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Segment>, StoreError> {
        (**self).segments_of_shelf(shelf_id)
    }

    fn placements_of_segment(&self, segment_id: SegmentId) -> Result<Vec<Placement>, StoreError> {
        (**self).placements_of_segment(segment_id)
    }

    fn placements_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Placement>, StoreError> {
        (**self).placements_of_shelf(shelf_id)
    }

    fn placements_of_product(&self, product_id: ProductId) -> Result<Vec<Placement>, StoreError> {
        (**self).placements_of_product(product_id)
    }

    fn version(&self, scope: Scope) -> Result<u64, StoreError> {
        (**self).version(scope)
    }

    fn commit(&self, write: LayoutWrite) -> Result<(), StoreError> {
        (**self).commit(write)
    }
}
