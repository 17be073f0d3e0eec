//! Product dimension registry.
//!
//! Physical attributes and facing rules of products, validated at write time.
//! Pure domain logic (no IO, no storage).

pub mod product;

pub use product::{Dimensions, FaceBounds, Manufacturer, NewProduct, Product};
