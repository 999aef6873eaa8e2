use crate::kind::{identified, require_text, EntityKind, GridEntity};
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

/// A cultivated field within a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub location_id: Option<RowId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub area_m2: f64,
}

identified!(Field);

impl GridEntity for Field {
    const KIND: EntityKind = EntityKind::Field;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("locationId", "Location"),
            ColumnDef::new("areaM2", "Area (m²)"),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        let mut result = require_text(ValidationResult::valid(), "name", &self.name, "Name is required");
        if self.location_id.is_none() {
            result = result.with_error("locationId", "Location is required");
        }
        if self.area_m2 < 0.0 {
            result = result.with_error("areaM2", "Area must not be negative");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_requires_location() {
        let field = Field {
            name: "Upper".to_string(),
            ..Field::default()
        };
        let result = field.validate();
        assert_eq!(result.error("locationId"), Some("Location is required"));
        assert_eq!(result.errors.len(), 1);
    }
}
