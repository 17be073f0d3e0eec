//! Read-side usage figures for a segment.

use serde::{Deserialize, Serialize};

use shelfplan_core::Entity;

use crate::placement::Placement;
use crate::segment::Segment;
use crate::shelf::Shelf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentUsage {
    pub segment: Segment,
    pub placement_count: usize,
    pub total_faces: u32,
    pub used_width: f64,
    pub available_width: f64,
    /// Percentage of the shelf width occupied (0 when empty).
    pub utilization: f64,
}

/// Summarise the active placements of `segment` on `shelf`.
pub fn segment_usage(shelf: &Shelf, segment: &Segment, placements: &[Placement]) -> SegmentUsage {
    let active: Vec<&Placement> = placements
        .iter()
        .filter(|p| p.is_active() && p.segment_id() == segment.id_typed())
        .collect();

    let used_width: f64 = active.iter().map(|p| p.occupied_width()).sum();
    let total_faces = active.iter().map(|p| p.face_count()).sum();

    SegmentUsage {
        segment: segment.clone(),
        placement_count: active.len(),
        total_faces,
        used_width,
        available_width: shelf.width() - used_width,
        utilization: if active.is_empty() {
            0.0
        } else {
            used_width / shelf.width() * 100.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shelfplan_core::{PlacementId, ProductId, SegmentId, ShelfId, UserId};
    use shelfplan_products::{Dimensions, FaceBounds, Manufacturer, NewProduct, Product};

    use crate::shelf::ShelfAttrs;

    #[test]
    fn usage_counts_only_active_placements() {
        let shelf = Shelf::create(
            ShelfId::new(),
            ShelfAttrs {
                name: "Wall".to_string(),
                width: 200.0,
                depth: 50.0,
                location: String::new(),
                description: String::new(),
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap();
        let segment =
            Segment::new(SegmentId::new(), shelf.id_typed(), 1, 30.0, UserId::new(), Utc::now())
                .unwrap();
        let product = Product::register(
            ProductId::new(),
            NewProduct {
                name: "Soap".to_string(),
                jan_code: None,
                manufacturer: Manufacturer::new("Clean Co", false),
                dimensions: Dimensions::new(10.0, 10.0, 10.0),
                faces: FaceBounds::new(1, 10, 2),
            },
            UserId::new(),
            Utc::now(),
        )
        .unwrap();

        let make = |x: f64, faces: u32| {
            Placement::new(
                PlacementId::new(),
                shelf.id_typed(),
                segment.id_typed(),
                &product,
                x,
                faces,
                UserId::new(),
                Utc::now(),
            )
            .unwrap()
        };
        let placements = vec![
            make(0.0, 3),
            make(30.0, 2),
            make(100.0, 4).deactivated(UserId::new(), Utc::now()).unwrap(),
        ];

        let usage = segment_usage(&shelf, &segment, &placements);
        assert_eq!(usage.placement_count, 2);
        assert_eq!(usage.total_faces, 5);
        assert_eq!(usage.used_width, 50.0);
        assert_eq!(usage.available_width, 150.0);
        assert_eq!(usage.utilization, 25.0);
    }
}
