//! Infrastructure layer: layout store, mutation/query services, config.

pub mod config;
pub mod error;
pub mod layout_service;
pub mod queries;
pub mod store;

mod lookup;

#[cfg(test)]
mod integration_tests;

pub use config::LayoutConfig;
pub use error::{EntityRef, LayoutError};
pub use layout_service::{LayoutMutationService, ShelfLayout};
pub use queries::{LayoutQueries, PlacementPreview, ProductPlacementStats, ShelfSummary};
pub use store::{InMemoryLayoutStore, LayoutStore, LayoutWrite, Scope, StoreError};
