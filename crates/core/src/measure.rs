//! Physical measurement policy.
//!
//! All lengths are centimetres held as `f64`.

use crate::error::{DomainError, DomainResult};

/// Largest accepted width/height/depth.
pub const MAX_DIMENSION_CM: f64 = 1000.0;

pub const MIN_FACE_COUNT: u32 = 1;
pub const MAX_FACE_COUNT: u32 = 50;

/// Validate a physical dimension: finite, strictly positive, at most 1000cm.
pub fn validate_dimension(field: &str, value: f64) -> DomainResult<f64> {
    if !value.is_finite() {
        return Err(DomainError::validation(format!("{field} must be a finite number")));
    }
    if value <= 0.0 {
        return Err(DomainError::validation(format!(
            "{field} must be greater than 0cm (got {value})"
        )));
    }
    if value > MAX_DIMENSION_CM {
        return Err(DomainError::validation(format!(
            "{field} must be at most {MAX_DIMENSION_CM}cm (got {value})"
        )));
    }
    Ok(value)
}

/// Validate a face-count bound used in a product definition.
pub fn validate_face_count(field: &str, value: u32) -> DomainResult<u32> {
    if !(MIN_FACE_COUNT..=MAX_FACE_COUNT).contains(&value) {
        return Err(DomainError::validation(format!(
            "{field} must be between {MIN_FACE_COUNT} and {MAX_FACE_COUNT} (got {value})"
        )));
    }
    Ok(value)
}

/// Segment levels start at 1 (the floor level).
pub fn validate_level(level: u32) -> DomainResult<u32> {
    if level == 0 {
        return Err(DomainError::validation("level must be 1 or greater"));
    }
    Ok(level)
}
