//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity and are compared by their attributes
/// (e.g. a product's `Dimensions`, its `FaceBounds`, or a computed
/// `PlacementGeometry`). To "modify" one, build a new one.
///
/// `PartialEq` rather than `Eq` because measurements are `f64`.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
