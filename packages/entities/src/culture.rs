use crate::kind::{identified, require_text, EntityKind, GridEntity};
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

/// A crop variety and its growing durations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Culture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub variety: String,

    /// Days from planting to first harvest
    #[serde(default)]
    pub days_to_maturity: u32,

    /// Days the harvest lasts once it starts
    #[serde(default)]
    pub harvest_window_days: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_spacing_cm: Option<u32>,
}

identified!(Culture);

impl GridEntity for Culture {
    const KIND: EntityKind = EntityKind::Culture;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("variety", "Variety"),
            ColumnDef::new("daysToMaturity", "Days to maturity"),
            ColumnDef::new("harvestWindowDays", "Harvest window (days)"),
            ColumnDef::new("rowSpacingCm", "Row spacing (cm)"),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        let mut result = require_text(ValidationResult::valid(), "name", &self.name, "Name is required");
        if self.days_to_maturity == 0 {
            result = result.with_error("daysToMaturity", "Days to maturity must be at least 1");
        }
        if self.row_spacing_cm == Some(0) {
            result = result.with_error("rowSpacingCm", "Row spacing must be at least 1 cm");
        }
        result
    }
}
