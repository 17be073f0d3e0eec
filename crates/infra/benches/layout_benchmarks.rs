use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use shelfplan_core::{PlacementId, ProductId, SegmentId, ShelfId, UserId};
use shelfplan_infra::{InMemoryLayoutStore, LayoutMutationService};
use shelfplan_products::{Dimensions, FaceBounds, Manufacturer, NewProduct, Product};
use shelfplan_shelves::{
    sweep_y_positions, validate, LayoutSnapshot, Placement, Segment, Shelf, ShelfAttrs,
};

fn shelf(width: f64) -> Shelf {
    Shelf::create(
        ShelfId::new(),
        ShelfAttrs {
            name: "Bench".to_string(),
            width,
            depth: 40.0,
            location: String::new(),
            description: String::new(),
        },
        UserId::new(),
        Utc::now(),
    )
    .unwrap()
}

fn product() -> Product {
    Product::register(
        ProductId::new(),
        NewProduct {
            name: "Bench item".to_string(),
            jan_code: None,
            manufacturer: Manufacturer::new("Bench Co", true),
            dimensions: Dimensions::new(1.0, 10.0, 5.0),
            faces: FaceBounds::new(1, 10, 2),
        },
        UserId::new(),
        Utc::now(),
    )
    .unwrap()
}

/// Packs `count` one-face placements flush against each other from x = 0.
fn packed_segment(count: usize) -> (Shelf, Segment, Product, Vec<Placement>) {
    let shelf = shelf(1000.0);
    let segment = Segment::new(SegmentId::new(), shelf.id_typed(), 1, 30.0, UserId::new(), Utc::now()).unwrap();
    let product = product();
    let placements = (0..count)
        .map(|i| {
            Placement::new(
                PlacementId::new(),
                shelf.id_typed(),
                segment.id_typed(),
                &product,
                i as f64,
                1,
                UserId::new(),
                Utc::now(),
            )
            .unwrap()
        })
        .collect();
    (shelf, segment, product, placements)
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for siblings in [10usize, 100, 500] {
        let (shelf, segment, product, placements) = packed_segment(siblings);
        let candidate = Placement::new(
            PlacementId::new(),
            shelf.id_typed(),
            segment.id_typed(),
            &product,
            siblings as f64,
            2,
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        group.throughput(Throughput::Elements(siblings as u64));
        group.bench_with_input(BenchmarkId::new("siblings", siblings), &siblings, |b, _| {
            let snapshot = LayoutSnapshot {
                shelf: &shelf,
                segment: &segment,
                siblings: &placements,
            };
            b.iter(|| validate(black_box(&candidate), &product, &snapshot, None))
        });
    }

    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_y_positions");

    for levels in [4u32, 16, 64] {
        let shelf = shelf(120.0);
        let segments: Vec<Segment> = (1..=levels)
            .map(|level| {
                Segment::new(SegmentId::new(), shelf.id_typed(), level, 30.0, UserId::new(), Utc::now()).unwrap()
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("levels", levels), &segments, |b, segments| {
            b.iter(|| sweep_y_positions(black_box(segments), 1))
        });
    }

    group.finish();
}

fn bench_place(c: &mut Criterion) {
    let mut group = c.benchmark_group("place");
    group.sample_size(200);

    group.bench_function("place_then_remove", |b| {
        let service = LayoutMutationService::new(InMemoryLayoutStore::new());
        let actor = UserId::new();
        let layout = service
            .create_shelf_with_segments(
                ShelfAttrs {
                    name: "Bench".to_string(),
                    width: 120.0,
                    depth: 40.0,
                    location: String::new(),
                    description: String::new(),
                },
                &[30.0],
                actor,
            )
            .unwrap();
        let product = service
            .register_product(
                NewProduct {
                    name: "Bench item".to_string(),
                    jan_code: None,
                    manufacturer: Manufacturer::new("Bench Co", true),
                    dimensions: Dimensions::new(10.0, 20.0, 5.0),
                    faces: FaceBounds::default(),
                },
                actor,
            )
            .unwrap();

        b.iter(|| {
            let placed = service
                .place(
                    layout.shelf.id_typed(),
                    layout.segments[0].id_typed(),
                    product.id_typed(),
                    black_box(0.0),
                    3,
                    actor,
                )
                .unwrap();
            service.remove(placed.id_typed(), actor).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_validate, bench_sweep, bench_place);
criterion_main!(benches);
