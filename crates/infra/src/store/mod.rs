//! Layout store boundary.
//!
//! The mutation service only needs CRUD plus a few filtered queries over
//! shelves, segments, placements and products, and an atomic batch commit
//! guarded by per-scope versions.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryLayoutStore;
pub use r#trait::{Guard, LayoutStore, LayoutWrite, Scope, StoreError};
