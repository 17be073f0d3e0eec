//! Layout API facade.
//!
//! Structure:
//! - `services.rs`: store + service wiring
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error bodies
//!
//! Every entry point takes ids as strings (as a transport would receive them)
//! and returns either a JSON payload or an [`errors::ErrorBody`].

use std::str::FromStr;
use std::sync::Arc;

use shelfplan_core::{DomainError, PlacementId, ProductId, SegmentId, ShelfId};
use shelfplan_infra::{InMemoryLayoutStore, LayoutConfig, LayoutStore};

use crate::context::RequestContext;

pub mod dto;
pub mod errors;
pub mod services;

pub type ApiResult = Result<serde_json::Value, errors::ErrorBody>;

#[derive(Debug)]
pub struct LayoutApi<S> {
    services: services::AppServices<S>,
}

/// Build the API over a fresh in-memory store (public entrypoint used by `main.rs`).
pub fn build_api(config: LayoutConfig) -> LayoutApi<Arc<InMemoryLayoutStore>> {
    LayoutApi::new(services::build_services(config))
}

fn parse_id<T>(raw: &str) -> Result<T, errors::ErrorBody>
where
    T: FromStr<Err = DomainError>,
{
    Ok(raw.parse::<T>()?)
}

impl<S> LayoutApi<S>
where
    S: LayoutStore,
{
    pub fn new(services: services::AppServices<S>) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &services::AppServices<S> {
        &self.services
    }

    // -------------------------
    // Shelves & segments
    // -------------------------

    pub fn create_shelf(&self, ctx: &RequestContext, body: dto::CreateShelfRequest) -> ApiResult {
        let layout = self.services.mutations.create_shelf_with_segments(
            body.attrs(),
            &body.segment_heights,
            ctx.actor(),
        )?;
        Ok(dto::layout_to_json(&layout))
    }

    pub fn add_segment(&self, ctx: &RequestContext, shelf_id: &str, body: dto::SegmentHeightRequest) -> ApiResult {
        let shelf_id: ShelfId = parse_id(shelf_id)?;
        let segment = self
            .services
            .mutations
            .add_segment(shelf_id, body.height, ctx.actor())?;
        Ok(dto::segment_to_json(&segment))
    }

    /// Returns the resized segment followed by the whole shelf's segments,
    /// since the offsets above it move too.
    pub fn resize_segment(&self, ctx: &RequestContext, segment_id: &str, body: dto::SegmentHeightRequest) -> ApiResult {
        let segment_id: SegmentId = parse_id(segment_id)?;
        let segment = self
            .services
            .mutations
            .resize_segment(segment_id, body.height, ctx.actor())?;
        let segments = self.services.queries.list_segments(segment.shelf_id())?;
        Ok(serde_json::json!({
            "segment": dto::segment_to_json(&segment),
            "segments": segments.iter().map(dto::segment_to_json).collect::<Vec<_>>(),
        }))
    }

    pub fn deactivate_segment(&self, ctx: &RequestContext, segment_id: &str) -> ApiResult {
        let segment_id: SegmentId = parse_id(segment_id)?;
        self.services
            .mutations
            .deactivate_segment(segment_id, ctx.actor())?;
        Ok(serde_json::json!({ "id": segment_id.to_string(), "active": false }))
    }

    pub fn deactivate_shelf(&self, ctx: &RequestContext, shelf_id: &str) -> ApiResult {
        let shelf_id: ShelfId = parse_id(shelf_id)?;
        self.services.mutations.deactivate_shelf(shelf_id, ctx.actor())?;
        Ok(serde_json::json!({ "id": shelf_id.to_string(), "active": false }))
    }

    pub fn list_shelves(&self) -> ApiResult {
        let shelves = self.services.queries.list_shelves()?;
        Ok(serde_json::json!(shelves.iter().map(dto::shelf_to_json).collect::<Vec<_>>()))
    }

    pub fn get_shelf(&self, shelf_id: &str) -> ApiResult {
        let shelf_id: ShelfId = parse_id(shelf_id)?;
        let shelf = self.services.queries.shelf(shelf_id)?;
        Ok(dto::shelf_to_json(&shelf))
    }

    pub fn list_segments(&self, shelf_id: &str) -> ApiResult {
        let shelf_id: ShelfId = parse_id(shelf_id)?;
        let segments = self.services.queries.list_segments(shelf_id)?;
        Ok(serde_json::json!(segments.iter().map(dto::segment_to_json).collect::<Vec<_>>()))
    }

    pub fn shelf_summary(&self, shelf_id: &str) -> ApiResult {
        let shelf_id: ShelfId = parse_id(shelf_id)?;
        let summary = self.services.queries.shelf_summary(shelf_id)?;
        Ok(dto::summary_to_json(&summary))
    }

    // -------------------------
    // Products
    // -------------------------

    pub fn register_product(&self, ctx: &RequestContext, body: dto::RegisterProductRequest) -> ApiResult {
        let product = self
            .services
            .mutations
            .register_product(body.into_new_product(), ctx.actor())?;
        Ok(dto::product_to_json(&product))
    }

    pub fn deactivate_product(&self, ctx: &RequestContext, product_id: &str) -> ApiResult {
        let product_id: ProductId = parse_id(product_id)?;
        let product = self
            .services
            .mutations
            .deactivate_product(product_id, ctx.actor())?;
        Ok(dto::product_to_json(&product))
    }

    pub fn delete_product(&self, ctx: &RequestContext, product_id: &str) -> ApiResult {
        let product_id: ProductId = parse_id(product_id)?;
        self.services
            .mutations
            .delete_product(product_id, ctx.actor())?;
        Ok(serde_json::json!({ "id": product_id.to_string(), "deleted": true }))
    }

    pub fn get_product(&self, product_id: &str) -> ApiResult {
        let product_id: ProductId = parse_id(product_id)?;
        let product = self.services.queries.product(product_id)?;
        Ok(dto::product_to_json(&product))
    }

    pub fn list_products(&self) -> ApiResult {
        let products = self.services.queries.list_products()?;
        Ok(serde_json::json!(products.iter().map(dto::product_to_json).collect::<Vec<_>>()))
    }

    pub fn product_stats(&self, product_id: &str) -> ApiResult {
        let product_id: ProductId = parse_id(product_id)?;
        let product = self.services.queries.product(product_id)?;
        let stats = self.services.queries.product_placement_stats(product_id)?;
        Ok(dto::product_stats_to_json(&product, stats.as_ref()))
    }

    // -------------------------
    // Placements
    // -------------------------

    pub fn place(&self, ctx: &RequestContext, body: dto::PlaceRequest) -> ApiResult {
        let placement = self.services.mutations.place(
            parse_id(&body.shelf_id)?,
            parse_id(&body.segment_id)?,
            parse_id(&body.product_id)?,
            body.x_position,
            body.face_count,
            ctx.actor(),
        )?;
        Ok(dto::placement_to_json(&placement))
    }

    pub fn move_placement(&self, ctx: &RequestContext, placement_id: &str, body: dto::MovePlacementRequest) -> ApiResult {
        let placement_id: PlacementId = parse_id(placement_id)?;
        let placement = self.services.mutations.move_or_resize(
            placement_id,
            body.x_position,
            body.face_count,
            ctx.actor(),
        )?;
        Ok(dto::placement_to_json(&placement))
    }

    pub fn remove_placement(&self, ctx: &RequestContext, placement_id: &str) -> ApiResult {
        let placement_id: PlacementId = parse_id(placement_id)?;
        self.services.mutations.remove(placement_id, ctx.actor())?;
        Ok(serde_json::json!({ "id": placement_id.to_string(), "active": false }))
    }

    pub fn list_placements(&self, segment_id: &str) -> ApiResult {
        let segment_id: SegmentId = parse_id(segment_id)?;
        let placements = self.services.queries.list_placements(segment_id)?;
        Ok(serde_json::json!(placements.iter().map(dto::placement_to_json).collect::<Vec<_>>()))
    }

    /// Dry run: violations come back as an error body, nothing is written.
    pub fn check_placement(&self, body: dto::CheckPlacementRequest) -> ApiResult {
        let exclude = body
            .exclude_id
            .as_deref()
            .map(parse_id::<PlacementId>)
            .transpose()?;
        let preview = self.services.queries.check_placement(
            parse_id(&body.segment_id)?,
            parse_id(&body.product_id)?,
            body.x_position,
            body.face_count,
            exclude,
        )?;
        Ok(dto::preview_to_json(&preview))
    }

    pub fn suggest_facing(&self, segment_id: &str, product_id: &str) -> ApiResult {
        let faces = self
            .services
            .queries
            .suggest_facing(parse_id(segment_id)?, parse_id(product_id)?)?;
        Ok(serde_json::json!({ "suggested_faces": faces }))
    }
}
