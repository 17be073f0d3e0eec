use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shelfplan_core::{
    AuditStamp, DomainError, DomainResult, Entity, Lifecycle, ProductId, UserId, ValueObject,
    validate_dimension, validate_face_count,
};

const JAN_CODE_MAX_LEN: usize = 13;
const MANUFACTURER_NAME_MAX_LEN: usize = 100;

/// Physical size of one product unit (cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl ValueObject for Dimensions {}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self { width, height, depth }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_dimension("width", self.width)?;
        validate_dimension("height", self.height)?;
        validate_dimension("depth", self.depth)?;
        Ok(())
    }

    /// Volume in cm³.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// Facing rules: how many side-by-side units a placement may show.
///
/// `recommended` is advisory; only `[min, max]` constrains placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub min: u32,
    pub max: u32,
    pub recommended: u32,
}

impl ValueObject for FaceBounds {}

impl Default for FaceBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: 10,
            recommended: 1,
        }
    }
}

impl FaceBounds {
    pub fn new(min: u32, max: u32, recommended: u32) -> Self {
        Self { min, max, recommended }
    }

    pub fn validate(&self) -> DomainResult<()> {
        validate_face_count("min_faces", self.min)?;
        validate_face_count("max_faces", self.max)?;
        validate_face_count("recommended_faces", self.recommended)?;

        if self.min > self.max {
            return Err(DomainError::validation(
                "min_faces must be less than or equal to max_faces",
            ));
        }
        if !(self.min..=self.max).contains(&self.recommended) {
            return Err(DomainError::validation(
                "recommended_faces must lie between min_faces and max_faces",
            ));
        }
        Ok(())
    }

    pub fn contains(&self, face_count: u32) -> bool {
        (self.min..=self.max).contains(&face_count)
    }
}

/// Maker of a product. Own-company makers are told apart from competitors
/// in shelf summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub name: String,
    #[serde(default)]
    pub is_own_company: bool,
}

impl ValueObject for Manufacturer {}

impl Manufacturer {
    pub fn new(name: impl Into<String>, is_own_company: bool) -> Self {
        Self {
            name: name.into(),
            is_own_company,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("manufacturer cannot be empty"));
        }
        if name.chars().count() > MANUFACTURER_NAME_MAX_LEN {
            return Err(DomainError::validation(format!(
                "manufacturer must be at most {MANUFACTURER_NAME_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}

/// Input for registering a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub jan_code: Option<String>,
    pub manufacturer: Manufacturer,
    pub dimensions: Dimensions,
    #[serde(default)]
    pub faces: FaceBounds,
}

/// A product as known to the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    jan_code: Option<String>,
    manufacturer: Manufacturer,
    dimensions: Dimensions,
    faces: FaceBounds,
    lifecycle: Lifecycle,
    audit: AuditStamp,
}

impl Product {
    /// Validate `new` and build an active product.
    pub fn register(
        id: ProductId,
        new: NewProduct,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        let jan_code = new.jan_code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
        if let Some(code) = &jan_code {
            validate_jan_code(code)?;
        }
        new.manufacturer.validate()?;
        new.dimensions.validate()?;
        new.faces.validate()?;

        Ok(Self {
            id,
            name: new.name.trim().to_string(),
            jan_code,
            manufacturer: Manufacturer {
                name: new.manufacturer.name.trim().to_string(),
                ..new.manufacturer
            },
            dimensions: new.dimensions,
            faces: new.faces,
            lifecycle: Lifecycle::Active,
            audit: AuditStamp::new(actor, now),
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jan_code(&self) -> Option<&str> {
        self.jan_code.as_deref()
    }

    pub fn manufacturer(&self) -> &Manufacturer {
        &self.manufacturer
    }

    /// True when the maker is the own company.
    pub fn is_own_product(&self) -> bool {
        self.manufacturer.is_own_company
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn width(&self) -> f64 {
        self.dimensions.width
    }

    pub fn height(&self) -> f64 {
        self.dimensions.height
    }

    pub fn depth(&self) -> f64 {
        self.dimensions.depth
    }

    pub fn faces(&self) -> FaceBounds {
        self.faces
    }

    pub fn audit(&self) -> AuditStamp {
        self.audit
    }

    pub fn volume(&self) -> f64 {
        self.dimensions.volume()
    }

    /// Suggested face count for `available_width` of free shelf space.
    ///
    /// Never exceeds `max_faces` nor `recommended + 2`; returns 0 when not
    /// even one unit fits.
    pub fn optimal_facing(&self, available_width: f64) -> u32 {
        if !available_width.is_finite() || available_width <= 0.0 {
            return 0;
        }
        let fits = (available_width / self.dimensions.width).floor() as u32;
        fits.min(self.faces.max)
            .min(self.faces.recommended.saturating_add(2))
    }

    /// Returns the deactivated copy. Deactivation never cascades to placements.
    pub fn deactivated(&self, actor: UserId, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            lifecycle: self.lifecycle.deactivate()?,
            audit: self.audit.touched(actor, now),
            ..self.clone()
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }
}

fn validate_jan_code(code: &str) -> DomainResult<()> {
    if code.len() > JAN_CODE_MAX_LEN || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::validation(format!(
            "jan_code must be at most {JAN_CODE_MAX_LEN} digits"
        )));
    }
    Ok(())
}
