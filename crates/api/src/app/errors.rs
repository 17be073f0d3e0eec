use serde::Serialize;
use thiserror::Error;

use shelfplan_core::DomainError;
use shelfplan_infra::LayoutError;
use shelfplan_shelves::Violation;

/// Structured failure returned to the transport layer.
///
/// `status` is the suggested HTTP status; it is not part of the body.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{error}: {message}")]
pub struct ErrorBody {
    #[serde(skip)]
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ViolationView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationView {
    pub code: &'static str,
    pub detail: String,
}

impl From<&Violation> for ViolationView {
    fn from(v: &Violation) -> Self {
        Self {
            code: v.code(),
            detail: v.to_string(),
        }
    }
}

impl From<LayoutError> for ErrorBody {
    fn from(err: LayoutError) -> Self {
        let message = err.to_string();
        match err {
            LayoutError::Violations(violations) => ErrorBody {
                violations: violations.iter().map(ViolationView::from).collect(),
                ..json_error(422, "layout_violation", message)
            },
            LayoutError::NotFound(_) => json_error(404, "not_found", message),
            LayoutError::InvalidRequest(_) => json_error(400, "validation_error", message),
            LayoutError::ProductInUse(_) => json_error(409, "product_in_use", message),
            LayoutError::Transient(_) => json_error(409, "conflict", message),
            LayoutError::Internal(_) => json_error(500, "internal_error", message),
        }
    }
}

impl From<DomainError> for ErrorBody {
    fn from(err: DomainError) -> Self {
        LayoutError::from(err).into()
    }
}

pub fn json_error(status: u16, code: &'static str, message: impl Into<String>) -> ErrorBody {
    ErrorBody {
        status,
        error: code,
        message: message.into(),
        violations: Vec::new(),
    }
}
