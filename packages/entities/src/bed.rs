use crate::kind::{identified, require_text, EntityKind, GridEntity};
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

/// A growing bed inside a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub field_id: Option<RowId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub length_m: f64,

    #[serde(default)]
    pub width_m: f64,

    /// Derived on write from length and width
    #[serde(default)]
    pub area_m2: f64,
}

identified!(Bed);

impl Bed {
    pub fn area(&self) -> f64 {
        self.length_m * self.width_m
    }
}

impl GridEntity for Bed {
    const KIND: EntityKind = EntityKind::Bed;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("fieldId", "Field"),
            ColumnDef::new("lengthM", "Length (m)"),
            ColumnDef::new("widthM", "Width (m)"),
            ColumnDef::new("areaM2", "Area (m²)").read_only(),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        let mut result = require_text(ValidationResult::valid(), "name", &self.name, "Name is required");
        if self.field_id.is_none() {
            result = result.with_error("fieldId", "Field is required");
        }
        if self.length_m <= 0.0 {
            result = result.with_error("lengthM", "Length must be greater than zero");
        }
        if self.width_m <= 0.0 {
            result = result.with_error("widthM", "Width must be greater than zero");
        }
        result
    }

    fn canonicalize(&mut self) {
        self.area_m2 = self.area();
    }
}
