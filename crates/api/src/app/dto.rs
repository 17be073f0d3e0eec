use serde::Deserialize;

use shelfplan_core::Entity;
use shelfplan_infra::{PlacementPreview, ProductPlacementStats, ShelfLayout, ShelfSummary};
use shelfplan_products::{Dimensions, FaceBounds, Manufacturer, NewProduct, Product};
use shelfplan_shelves::{Placement, Segment, SegmentUsage, Shelf, ShelfAttrs};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateShelfRequest {
    pub name: String,
    pub width: f64,
    pub depth: f64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    /// Bottom-up: the first height becomes level 1.
    #[serde(default)]
    pub segment_heights: Vec<f64>,
}

impl CreateShelfRequest {
    pub fn attrs(&self) -> ShelfAttrs {
        ShelfAttrs {
            name: self.name.clone(),
            width: self.width,
            depth: self.depth,
            location: self.location.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SegmentHeightRequest {
    pub height: f64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    pub name: String,
    pub jan_code: Option<String>,
    pub manufacturer: String,
    #[serde(default)]
    pub is_own_company: bool,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub min_faces: Option<u32>,
    pub max_faces: Option<u32>,
    pub recommended_faces: Option<u32>,
}

impl RegisterProductRequest {
    /// Missing face bounds take the registry defaults.
    pub fn into_new_product(self) -> NewProduct {
        let defaults = FaceBounds::default();
        NewProduct {
            name: self.name,
            jan_code: self.jan_code,
            manufacturer: Manufacturer::new(self.manufacturer, self.is_own_company),
            dimensions: Dimensions::new(self.width, self.height, self.depth),
            faces: FaceBounds::new(
                self.min_faces.unwrap_or(defaults.min),
                self.max_faces.unwrap_or(defaults.max),
                self.recommended_faces.unwrap_or(defaults.recommended),
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PlaceRequest {
    pub shelf_id: String,
    pub segment_id: String,
    pub product_id: String,
    pub x_position: f64,
    pub face_count: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovePlacementRequest {
    pub x_position: Option<f64>,
    pub face_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPlacementRequest {
    pub segment_id: String,
    pub product_id: String,
    pub x_position: f64,
    pub face_count: u32,
    /// Placement being moved, if this is a move preview.
    pub exclude_id: Option<String>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn shelf_to_json(shelf: &Shelf) -> serde_json::Value {
    serde_json::json!({
        "id": shelf.id_typed().to_string(),
        "name": shelf.name(),
        "width": shelf.width(),
        "depth": shelf.depth(),
        "location": shelf.location(),
        "description": shelf.description(),
        "active": shelf.is_active(),
        "updated_at": shelf.audit().updated_at.to_rfc3339(),
    })
}

pub fn segment_to_json(segment: &Segment) -> serde_json::Value {
    serde_json::json!({
        "id": segment.id_typed().to_string(),
        "shelf_id": segment.shelf_id().to_string(),
        "level": segment.level(),
        "height": segment.height(),
        "y_position": segment.y_position(),
        "active": segment.is_active(),
    })
}

pub fn layout_to_json(layout: &ShelfLayout) -> serde_json::Value {
    serde_json::json!({
        "shelf": shelf_to_json(&layout.shelf),
        "segments": layout.segments.iter().map(segment_to_json).collect::<Vec<_>>(),
    })
}

pub fn placement_to_json(placement: &Placement) -> serde_json::Value {
    serde_json::json!({
        "id": placement.id_typed().to_string(),
        "shelf_id": placement.shelf_id().to_string(),
        "segment_id": placement.segment_id().to_string(),
        "product_id": placement.product_id().to_string(),
        "x_position": placement.x_position(),
        "face_count": placement.face_count(),
        "occupied_width": placement.occupied_width(),
        "end_position": placement.end_position(),
        "active": placement.is_active(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    let faces = product.faces();
    serde_json::json!({
        "id": product.id_typed().to_string(),
        "name": product.name(),
        "jan_code": product.jan_code(),
        "manufacturer": product.manufacturer().name,
        "is_own_product": product.is_own_product(),
        "width": product.width(),
        "height": product.height(),
        "depth": product.depth(),
        "volume": product.volume(),
        "min_faces": faces.min,
        "max_faces": faces.max,
        "recommended_faces": faces.recommended,
        "active": product.is_active(),
    })
}

pub fn preview_to_json(preview: &PlacementPreview) -> serde_json::Value {
    serde_json::json!({
        "valid": true,
        "occupied_width": preview.occupied_width,
        "end_position": preview.end_position,
        "available_width": preview.available_width,
    })
}

fn usage_to_json(usage: &SegmentUsage) -> serde_json::Value {
    serde_json::json!({
        "segment": segment_to_json(&usage.segment),
        "placement_count": usage.placement_count,
        "total_faces": usage.total_faces,
        "used_width": usage.used_width,
        "available_width": usage.available_width,
        "utilization": usage.utilization,
    })
}

pub fn summary_to_json(summary: &ShelfSummary) -> serde_json::Value {
    serde_json::json!({
        "shelf": shelf_to_json(&summary.shelf),
        "total_height": summary.total_height,
        "segment_count": summary.segment_count,
        "total_placements": summary.total_placements,
        "total_faces": summary.total_faces,
        "own_placements": summary.own_placements,
        "competitor_placements": summary.competitor_placements,
        "average_utilization": summary.average_utilization,
        "segments": summary.segments.iter().map(usage_to_json).collect::<Vec<_>>(),
    })
}

pub fn product_stats_to_json(
    product: &Product,
    stats: Option<&ProductPlacementStats>,
) -> serde_json::Value {
    serde_json::json!({
        "product": product_to_json(product),
        "placement_count": stats.map_or(0, |s| s.placement_count),
        "total_faces": stats.map_or(0, |s| s.total_faces),
        "shelf_count": stats.map_or(0, |s| s.shelf_count),
        "average_faces": stats.map(|s| s.average_faces),
    })
}
