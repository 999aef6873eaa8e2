use crate::culture::Culture;
use crate::kind::{identified, EntityKind, GridEntity};
use chrono::{Days, NaiveDate};
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

/// One culture planted on one bed for one season
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantingPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub culture_id: Option<RowId>,

    #[serde(default)]
    pub bed_id: Option<RowId>,

    #[serde(default)]
    pub planting_date: Option<NaiveDate>,

    #[serde(default)]
    pub harvest_start: Option<NaiveDate>,

    #[serde(default)]
    pub harvest_end: Option<NaiveDate>,

    /// Share of the bed in use, in square metres
    #[serde(default)]
    pub area_m2: f64,
}

identified!(PlantingPlan);

impl PlantingPlan {
    /// Fill the harvest window from the culture's durations.
    ///
    /// Leaves both dates empty when there is no planting date or the
    /// arithmetic would leave the calendar.
    pub fn derive_dates(&mut self, culture: &Culture) {
        let start = self
            .planting_date
            .and_then(|date| date.checked_add_days(Days::new(u64::from(culture.days_to_maturity))));
        let end = start
            .and_then(|date| date.checked_add_days(Days::new(u64::from(culture.harvest_window_days))));

        self.harvest_start = start;
        self.harvest_end = end;
    }
}

impl GridEntity for PlantingPlan {
    const KIND: EntityKind = EntityKind::PlantingPlan;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("cultureId", "Culture"),
            ColumnDef::new("bedId", "Bed"),
            ColumnDef::new("plantingDate", "Planting date"),
            ColumnDef::new("areaM2", "Area (m²)"),
            ColumnDef::new("harvestStart", "Harvest start").read_only(),
            ColumnDef::new("harvestEnd", "Harvest end").read_only(),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::valid();
        if self.culture_id.is_none() {
            result = result.with_error("cultureId", "Culture is required");
        }
        if self.bed_id.is_none() {
            result = result.with_error("bedId", "Bed is required");
        }
        if self.planting_date.is_none() {
            result = result.with_error("plantingDate", "Planting date is required");
        }
        if self.area_m2 < 0.0 {
            result = result.with_error("areaM2", "Area must not be negative");
        }
        result
    }
}
