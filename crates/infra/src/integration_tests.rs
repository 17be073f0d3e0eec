//! End-to-end tests for the layout services over the in-memory store.
//!
//! Verifies:
//! - Successful mutations persist recomputed geometry
//! - Rejected mutations leave the store untouched
//! - Cascades and y-offset sweeps land in the same commit
//! - Concurrent placements on one segment never overlap

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use shelfplan_core::{Entity, PlacementId, ProductId, SegmentId, ShelfId, UserId};
use shelfplan_products::{Dimensions, FaceBounds, Manufacturer, NewProduct, Product};
use shelfplan_shelves::{Placement, Segment, Shelf, ShelfAttrs, Violation};

use crate::config::LayoutConfig;
use crate::error::{EntityRef, LayoutError};
use crate::layout_service::{LayoutMutationService, ShelfLayout};
use crate::queries::LayoutQueries;
use crate::store::{InMemoryLayoutStore, LayoutStore, LayoutWrite, Scope, StoreError};

type Service = LayoutMutationService<Arc<InMemoryLayoutStore>>;

struct Fixture {
    store: Arc<InMemoryLayoutStore>,
    service: Service,
    queries: LayoutQueries<Arc<InMemoryLayoutStore>>,
    actor: UserId,
}

fn setup() -> Fixture {
    let store = Arc::new(InMemoryLayoutStore::new());
    Fixture {
        service: LayoutMutationService::new(store.clone()),
        queries: LayoutQueries::new(store.clone()),
        store,
        actor: UserId::new(),
    }
}

fn attrs(width: f64) -> ShelfAttrs {
    ShelfAttrs {
        name: "Aisle 3".to_string(),
        width,
        depth: 45.0,
        location: "Front".to_string(),
        description: String::new(),
    }
}

fn new_product(name: &str, width: f64, height: f64, faces: FaceBounds) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        jan_code: None,
        manufacturer: Manufacturer::new("Acme", false),
        dimensions: Dimensions::new(width, height, 8.0),
        faces,
    }
}

impl Fixture {
    fn shelf(&self, width: f64, heights: &[f64]) -> ShelfLayout {
        self.service
            .create_shelf_with_segments(attrs(width), heights, self.actor)
            .unwrap()
    }

    fn product(&self, width: f64, height: f64) -> Product {
        self.service
            .register_product(
                new_product("Cola 500ml", width, height, FaceBounds::new(1, 6, 3)),
                self.actor,
            )
            .unwrap()
    }

    fn place(&self, layout: &ShelfLayout, level: usize, product: &Product, x: f64, faces: u32) -> Result<Placement, LayoutError> {
        self.service.place(
            layout.shelf.id_typed(),
            layout.segments[level].id_typed(),
            product.id_typed(),
            x,
            faces,
            self.actor,
        )
    }

    fn stored_segment(&self, id: SegmentId) -> Segment {
        self.store.segment(id).unwrap().unwrap()
    }
}

fn codes(err: &LayoutError) -> Vec<&'static str> {
    err.violations().iter().map(Violation::code).collect()
}

#[test]
fn flush_adjacent_placements_succeed_and_overlap_is_rejected() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let p1 = fx.product(10.0, 20.0);
    let p2 = fx.product(10.0, 20.0);

    let first = fx.place(&layout, 0, &p1, 0.0, 5).unwrap();
    assert_eq!(first.occupied_width(), 50.0);
    assert_eq!(first.end_position(), 50.0);

    let second = fx.place(&layout, 0, &p2, 50.0, 5).unwrap();
    assert_eq!(second.end_position(), 100.0);

    let err = fx.place(&layout, 0, &p1, 40.0, 1).unwrap_err();
    match err.violations() {
        [Violation::OverlapDetected { placement_id, .. }] => {
            assert_eq!(*placement_id, first.id_typed());
        }
        other => panic!("expected a single overlap, got {other:?}"),
    }

    let stored = fx.queries.list_placements(layout.segments[0].id_typed()).unwrap();
    assert_eq!(stored, vec![first, second]);
}

#[test]
fn too_tall_product_is_rejected_and_store_unchanged() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[20.0]);
    let tall = fx.product(10.0, 25.0);
    let segment_id = layout.segments[0].id_typed();
    let before = fx.store.version(Scope::Segment(segment_id)).unwrap();

    for x in [0.0, 30.0, 90.0] {
        let err = fx.place(&layout, 0, &tall, x, 1).unwrap_err();
        assert_eq!(codes(&err), vec!["HEIGHT_EXCEEDED"]);
    }

    assert!(fx.store.placements_of_segment(segment_id).unwrap().is_empty());
    assert_eq!(fx.store.version(Scope::Segment(segment_id)).unwrap(), before);
}

#[test]
fn every_violated_rule_is_reported() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let small = fx.product(10.0, 20.0);
    let tall = fx.product(10.0, 40.0);
    fx.place(&layout, 0, &small, 0.0, 5).unwrap();

    let err = fx.place(&layout, 0, &tall, 20.0, 12).unwrap_err();
    assert_eq!(
        codes(&err),
        vec!["HEIGHT_EXCEEDED", "WIDTH_EXCEEDED", "FACE_COUNT_OUT_OF_RANGE", "OVERLAP_DETECTED"]
    );
}

#[test]
fn move_with_current_values_is_a_noop() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 0, &product, 10.0, 3).unwrap();

    let same = fx
        .service
        .move_or_resize(placed.id_typed(), Some(10.0), Some(3), fx.actor)
        .unwrap();
    assert_eq!(same.geometry(), placed.geometry());

    let stored = fx.queries.placement(placed.id_typed()).unwrap();
    assert_eq!(stored.x_position(), placed.x_position());
    assert_eq!(stored.face_count(), placed.face_count());
    assert_eq!(stored.geometry(), placed.geometry());

    let defaulted = fx
        .service
        .move_or_resize(placed.id_typed(), None, None, fx.actor)
        .unwrap();
    assert_eq!(defaulted.x_position(), 10.0);
    assert_eq!(defaulted.occupied_width(), 30.0);
}

#[test]
fn move_recomputes_geometry_and_rejects_collisions() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let left = fx.place(&layout, 0, &product, 0.0, 2).unwrap();
    let right = fx.place(&layout, 0, &product, 60.0, 2).unwrap();

    let widened = fx
        .service
        .move_or_resize(left.id_typed(), None, Some(4), fx.actor)
        .unwrap();
    assert_eq!(widened.occupied_width(), 40.0);
    assert_eq!(widened.end_position(), 40.0);

    let err = fx
        .service
        .move_or_resize(right.id_typed(), Some(30.0), None, fx.actor)
        .unwrap_err();
    assert_eq!(codes(&err), vec!["OVERLAP_DETECTED"]);

    let stored = fx.store.placement(right.id_typed()).unwrap().unwrap();
    assert_eq!(stored.x_position(), 60.0);
}

#[test]
fn removed_placement_frees_its_span() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 0, &product, 0.0, 5).unwrap();

    fx.service.remove(placed.id_typed(), fx.actor).unwrap();
    fx.place(&layout, 0, &product, 0.0, 5).unwrap();

    let err = fx.service.remove(placed.id_typed(), fx.actor).unwrap_err();
    assert_eq!(err, LayoutError::NotFound(EntityRef::Placement(placed.id_typed())));
}

#[test]
fn shrinking_below_tallest_occupant_is_refused() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0]);
    let product = fx.product(10.0, 25.0);
    fx.place(&layout, 0, &product, 0.0, 1).unwrap();
    let segment_id = layout.segments[0].id_typed();

    let err = fx.service.resize_segment(segment_id, 24.0, fx.actor).unwrap_err();
    assert_eq!(codes(&err), vec!["SEGMENT_TOO_SMALL_FOR_EXISTING"]);
    assert_eq!(fx.stored_segment(segment_id).height(), 30.0);
    assert_eq!(fx.stored_segment(layout.segments[1].id_typed()).y_position(), 30.0);

    let resized = fx.service.resize_segment(segment_id, 25.0, fx.actor).unwrap();
    assert_eq!(resized.height(), 25.0);
}

#[test]
fn resize_shifts_every_level_above() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0, 50.0]);
    let offsets: Vec<f64> = layout.segments.iter().map(Segment::y_position).collect();
    assert_eq!(offsets, vec![0.0, 30.0, 70.0]);

    fx.service
        .resize_segment(layout.segments[1].id_typed(), 45.0, fx.actor)
        .unwrap();

    let segments = fx.queries.list_segments(layout.shelf.id_typed()).unwrap();
    let offsets: Vec<f64> = segments.iter().map(Segment::y_position).collect();
    assert_eq!(offsets, vec![0.0, 30.0, 75.0]);
}

#[test]
fn invalid_segment_height_creates_nothing() {
    let fx = setup();
    let err = fx
        .service
        .create_shelf_with_segments(attrs(120.0), &[30.0, -5.0], fx.actor)
        .unwrap_err();
    assert!(matches!(err, LayoutError::InvalidRequest(_)));
    assert!(fx.store.shelves().unwrap().is_empty());
}

#[test]
fn added_segment_stacks_on_top() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0]);

    let added = fx
        .service
        .add_segment(layout.shelf.id_typed(), 25.0, fx.actor)
        .unwrap();
    assert_eq!(added.level(), 3);
    assert_eq!(added.y_position(), 70.0);
}

#[test]
fn deactivating_segment_cascades_and_closes_the_gap() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0, 50.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 1, &product, 0.0, 2).unwrap();

    fx.service
        .deactivate_segment(layout.segments[1].id_typed(), fx.actor)
        .unwrap();

    let stored = fx.store.placement(placed.id_typed()).unwrap().unwrap();
    assert!(!stored.is_active());

    let segments = fx.queries.list_segments(layout.shelf.id_typed()).unwrap();
    let levels: Vec<(u32, f64)> = segments.iter().map(|s| (s.level(), s.y_position())).collect();
    assert_eq!(levels, vec![(1, 0.0), (3, 30.0)]);

    let err = fx.place(&layout, 1, &product, 50.0, 1).unwrap_err();
    assert_eq!(
        err,
        LayoutError::NotFound(EntityRef::Segment(layout.segments[1].id_typed()))
    );
}

#[test]
fn deactivating_shelf_cascades_to_everything_on_it() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0]);
    let product = fx.product(10.0, 20.0);
    let a = fx.place(&layout, 0, &product, 0.0, 1).unwrap();
    let b = fx.place(&layout, 1, &product, 0.0, 1).unwrap();

    fx.service
        .deactivate_shelf(layout.shelf.id_typed(), fx.actor)
        .unwrap();

    let shelf: Shelf = fx.store.shelf(layout.shelf.id_typed()).unwrap().unwrap();
    assert!(!shelf.is_active());
    for segment in &layout.segments {
        assert!(!fx.stored_segment(segment.id_typed()).is_active());
    }
    for placement in [a, b] {
        assert!(!fx.store.placement(placement.id_typed()).unwrap().unwrap().is_active());
    }
    assert!(fx.queries.list_shelves().unwrap().is_empty());
}

#[test]
fn unknown_references_are_not_found_before_validation() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let ghost_product = ProductId::new();
    let ghost_shelf = ShelfId::new();

    let err = fx
        .service
        .place(layout.shelf.id_typed(), layout.segments[0].id_typed(), ghost_product, 500.0, 0, fx.actor)
        .unwrap_err();
    assert_eq!(err, LayoutError::NotFound(EntityRef::Product(ghost_product)));

    let err = fx
        .service
        .place(ghost_shelf, layout.segments[0].id_typed(), product.id_typed(), 0.0, 1, fx.actor)
        .unwrap_err();
    assert_eq!(err, LayoutError::NotFound(EntityRef::Shelf(ghost_shelf)));

    let err = fx
        .service
        .move_or_resize(PlacementId::new(), Some(0.0), None, fx.actor)
        .unwrap_err();
    assert!(matches!(err, LayoutError::NotFound(EntityRef::Placement(_))));
}

#[test]
fn segment_from_another_shelf_is_a_mismatch() {
    let fx = setup();
    let home = fx.shelf(120.0, &[30.0]);
    let other = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);

    let err = fx
        .service
        .place(home.shelf.id_typed(), other.segments[0].id_typed(), product.id_typed(), 0.0, 1, fx.actor)
        .unwrap_err();
    assert_eq!(codes(&err), vec!["SEGMENT_SHELF_MISMATCH"]);
}

#[test]
fn non_finite_position_is_an_invalid_request() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);

    let err = fx.place(&layout, 0, &product, f64::NAN, 1).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidRequest(_)));
}

#[test]
fn deactivated_product_keeps_placements_but_cannot_be_placed_again() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 0, &product, 0.0, 2).unwrap();

    fx.service.deactivate_product(product.id_typed(), fx.actor).unwrap();

    let err = fx.place(&layout, 0, &product, 50.0, 1).unwrap_err();
    assert_eq!(err, LayoutError::NotFound(EntityRef::Product(product.id_typed())));

    let moved = fx
        .service
        .move_or_resize(placed.id_typed(), Some(20.0), None, fx.actor)
        .unwrap();
    assert_eq!(moved.end_position(), 40.0);
}

#[test]
fn delete_product_is_refused_while_in_use() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 0, &product, 0.0, 2).unwrap();

    let err = fx.service.delete_product(product.id_typed(), fx.actor).unwrap_err();
    assert_eq!(err, LayoutError::ProductInUse(product.id_typed()));

    fx.service.remove(placed.id_typed(), fx.actor).unwrap();
    fx.service.delete_product(product.id_typed(), fx.actor).unwrap();

    assert!(fx.store.product(product.id_typed()).unwrap().is_none());
    assert!(fx.store.placement(placed.id_typed()).unwrap().is_none());
}

#[test]
fn jan_code_is_unique_among_active_products() {
    let fx = setup();
    let with_code = |name: &str| NewProduct {
        jan_code: Some("4901234567894".to_string()),
        ..new_product(name, 6.0, 20.0, FaceBounds::default())
    };

    let first = fx.service.register_product(with_code("Tea"), fx.actor).unwrap();
    let err = fx.service.register_product(with_code("Tea 2"), fx.actor).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidRequest(_)));

    fx.service.deactivate_product(first.id_typed(), fx.actor).unwrap();
    fx.service.register_product(with_code("Tea 2"), fx.actor).unwrap();
}

#[test]
fn queries_summarise_usage() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 40.0]);
    let product = fx.product(10.0, 20.0);
    let house = fx
        .service
        .register_product(
            NewProduct {
                manufacturer: Manufacturer::new("House Brand", true),
                ..new_product("House cola", 10.0, 20.0, FaceBounds::new(1, 6, 3))
            },
            fx.actor,
        )
        .unwrap();
    fx.place(&layout, 0, &product, 0.0, 5).unwrap();
    fx.place(&layout, 1, &product, 0.0, 3).unwrap();
    fx.place(&layout, 0, &house, 50.0, 1).unwrap();
    let removed = fx.place(&layout, 1, &house, 30.0, 2).unwrap();
    fx.service.remove(removed.id_typed(), fx.actor).unwrap();

    let summary = fx.queries.shelf_summary(layout.shelf.id_typed()).unwrap();
    assert_eq!(summary.total_height, 70.0);
    assert_eq!(summary.segment_count, 2);
    assert_eq!(summary.total_placements, 3);
    assert_eq!(summary.total_faces, 9);
    assert_eq!(summary.own_placements, 1);
    assert_eq!(summary.competitor_placements, 2);
    assert!((summary.average_utilization - (90.0 / 240.0 * 100.0)).abs() < 1e-9);

    let stats = fx
        .queries
        .product_placement_stats(product.id_typed())
        .unwrap()
        .unwrap();
    assert_eq!(stats.placement_count, 2);
    assert_eq!(stats.shelf_count, 1);
    assert_eq!(stats.average_faces, 4.0);

    let unused = fx.product(5.0, 5.0);
    assert!(fx.queries.product_placement_stats(unused.id_typed()).unwrap().is_none());

    // 60cm left on level 1: min(6 fit, 6 max, 3 + 2)
    let suggested = fx
        .queries
        .suggest_facing(layout.segments[0].id_typed(), product.id_typed())
        .unwrap();
    assert_eq!(suggested, 5);
}

#[test]
fn dry_run_reports_geometry_without_writing() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);
    let placed = fx.place(&layout, 0, &product, 0.0, 5).unwrap();
    let segment_id = layout.segments[0].id_typed();

    let preview = fx
        .queries
        .check_placement(segment_id, product.id_typed(), 50.0, 5, None)
        .unwrap();
    assert_eq!(preview.end_position, 100.0);
    assert_eq!(preview.available_width, 20.0);

    let err = fx
        .queries
        .check_placement(segment_id, product.id_typed(), 40.0, 1, None)
        .unwrap_err();
    assert_eq!(codes(&err), vec!["OVERLAP_DETECTED"]);

    // Checking the existing placement against itself is not an overlap.
    fx.queries
        .check_placement(segment_id, product.id_typed(), 10.0, 5, Some(placed.id_typed()))
        .unwrap();

    assert_eq!(fx.store.placements_of_segment(segment_id).unwrap().len(), 1);
}

#[test]
fn concurrent_placements_on_one_segment_never_overlap() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0]);
    let product = fx.product(10.0, 20.0);

    let results: Vec<Result<Placement, LayoutError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let fx = &fx;
                let layout = &layout;
                let product = &product;
                scope.spawn(move || fx.place(layout, 0, product, f64::from(i) * 5.0, 4))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let placed: Vec<&Placement> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(placed.len(), 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        match err {
            LayoutError::Transient(_) => {}
            LayoutError::Violations(v) => {
                assert!(v.iter().all(|v| v.code() == "OVERLAP_DETECTED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    let stored = fx.queries.list_placements(layout.segments[0].id_typed()).unwrap();
    assert_eq!(stored.len(), 1);
}

#[test]
fn concurrent_placements_on_different_segments_do_not_interfere() {
    let fx = setup();
    let layout = fx.shelf(120.0, &[30.0, 30.0, 30.0, 30.0]);
    let product = fx.product(10.0, 20.0);

    std::thread::scope(|scope| {
        for level in 0..layout.segments.len() {
            let fx = &fx;
            let layout = &layout;
            let product = &product;
            scope.spawn(move || fx.place(layout, level, product, 0.0, 6).unwrap());
        }
    });

    for segment in &layout.segments {
        assert_eq!(fx.queries.list_placements(segment.id_typed()).unwrap().len(), 1);
    }
}

/// Store wrapper whose first `conflicts` commits fail with a conflict.
struct FlakyStore {
    inner: InMemoryLayoutStore,
    conflicts: AtomicU32,
    commits_seen: AtomicU32,
}

impl FlakyStore {
    fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryLayoutStore::new(),
            conflicts: AtomicU32::new(conflicts),
            commits_seen: AtomicU32::new(0),
        }
    }
}

impl LayoutStore for FlakyStore {
    fn shelf(&self, id: ShelfId) -> Result<Option<Shelf>, StoreError> {
        self.inner.shelf(id)
    }

    fn segment(&self, id: SegmentId) -> Result<Option<Segment>, StoreError> {
        self.inner.segment(id)
    }

    fn placement(&self, id: PlacementId) -> Result<Option<Placement>, StoreError> {
        self.inner.placement(id)
    }

    fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        self.inner.product(id)
    }

    fn shelves(&self) -> Result<Vec<Shelf>, StoreError> {
        self.inner.shelves()
    }

    fn products(&self) -> Result<Vec<Product>, StoreError> {
        self.inner.products()
    }

    fn segments_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Segment>, StoreError> {
        self.inner.segments_of_shelf(shelf_id)
    }

    fn placements_of_segment(&self, segment_id: SegmentId) -> Result<Vec<Placement>, StoreError> {
        self.inner.placements_of_segment(segment_id)
    }

    fn placements_of_shelf(&self, shelf_id: ShelfId) -> Result<Vec<Placement>, StoreError> {
        self.inner.placements_of_shelf(shelf_id)
    }

    fn placements_of_product(&self, product_id: ProductId) -> Result<Vec<Placement>, StoreError> {
        self.inner.placements_of_product(product_id)
    }

    fn version(&self, scope: Scope) -> Result<u64, StoreError> {
        self.inner.version(scope)
    }

    fn commit(&self, write: LayoutWrite) -> Result<(), StoreError> {
        self.commits_seen.fetch_add(1, Ordering::SeqCst);
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Conflict("simulated".to_string()));
        }
        self.inner.commit(write)
    }
}

#[test]
fn single_conflict_is_retried_transparently() {
    let service = LayoutMutationService::new(FlakyStore::new(1));
    let actor = UserId::new();

    let layout = service
        .create_shelf_with_segments(attrs(120.0), &[30.0], actor)
        .unwrap();

    assert_eq!(service.store().commits_seen.load(Ordering::SeqCst), 2);
    assert!(service.store().shelf(layout.shelf.id_typed()).unwrap().is_some());
}

#[test]
fn repeated_conflicts_surface_as_transient() {
    let service = LayoutMutationService::new(FlakyStore::new(5));
    let actor = UserId::new();

    let err = service
        .create_shelf_with_segments(attrs(120.0), &[30.0], actor)
        .unwrap_err();
    assert!(matches!(err, LayoutError::Transient(_)));
    assert_eq!(service.store().commits_seen.load(Ordering::SeqCst), 2);
    assert!(service.store().shelves().unwrap().is_empty());
}

#[test]
fn commit_attempts_follow_config() {
    let config = LayoutConfig::default().with_max_commit_attempts(4);
    let service = LayoutMutationService::with_config(FlakyStore::new(3), config);

    service
        .register_product(new_product("Soap", 7.0, 12.0, FaceBounds::default()), UserId::new())
        .unwrap();
    assert_eq!(service.store().commits_seen.load(Ordering::SeqCst), 4);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use shelfplan_shelves::spans_overlap;

    #[derive(Debug, Clone)]
    enum Op {
        Place { wide: bool, x: u16, faces: u32 },
        Move { pick: prop::sample::Index, x: Option<u16>, faces: Option<u32> },
        Remove { pick: prop::sample::Index },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (any::<bool>(), 0u16..130, 1u32..8)
                .prop_map(|(wide, x, faces)| Op::Place { wide, x, faces }),
            (any::<prop::sample::Index>(), proptest::option::of(0u16..130), proptest::option::of(1u32..8))
                .prop_map(|(pick, x, faces)| Op::Move { pick, x, faces }),
            any::<prop::sample::Index>().prop_map(|pick| Op::Remove { pick }),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: whatever sequence of edits lands, the segment's active
        /// placements stay disjoint and keep their derived geometry.
        #[test]
        fn edit_sequences_keep_segment_consistent(ops in proptest::collection::vec(op(), 1..30)) {
            let fx = setup();
            let layout = fx.shelf(120.0, &[30.0]);
            let segment_id = layout.segments[0].id_typed();
            let narrow = fx.product(7.5, 20.0);
            let wide = fx.product(10.0, 20.0);

            for step in ops {
                let active = fx.queries.list_placements(segment_id).unwrap();
                // Rejections are expected; the invariants below must hold either way.
                let _ = match step {
                    Op::Place { wide: w, x, faces } => {
                        let product = if w { &wide } else { &narrow };
                        fx.place(&layout, 0, product, f64::from(x), faces).map(|_| ())
                    }
                    Op::Move { pick, x, faces } if !active.is_empty() => fx
                        .service
                        .move_or_resize(
                            active[pick.index(active.len())].id_typed(),
                            x.map(f64::from),
                            faces,
                            fx.actor,
                        )
                        .map(|_| ()),
                    Op::Remove { pick } if !active.is_empty() => fx
                        .service
                        .remove(active[pick.index(active.len())].id_typed(), fx.actor),
                    _ => Ok(()),
                };

                let stored: Vec<Placement> = fx
                    .store
                    .placements_of_segment(segment_id)
                    .unwrap()
                    .into_iter()
                    .filter(|p| p.is_active())
                    .collect();

                for (i, a) in stored.iter().enumerate() {
                    let width = if a.product_id() == wide.id_typed() { 10.0 } else { 7.5 };
                    prop_assert_eq!(a.occupied_width(), width * f64::from(a.face_count()));
                    prop_assert_eq!(a.end_position(), a.x_position() + a.occupied_width());
                    prop_assert!(a.end_position() <= 120.0);
                    for b in &stored[i + 1..] {
                        prop_assert!(
                            !spans_overlap(a.span(), b.span()),
                            "{:?} overlaps {:?}",
                            a.span(),
                            b.span()
                        );
                    }
                }
            }
        }
    }
}
