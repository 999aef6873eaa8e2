use crate::kind::{identified, require_text, EntityKind, GridEntity};
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

/// A farm site; fields belong to a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub notes: String,
}

identified!(Location);

impl GridEntity for Location {
    const KIND: EntityKind = EntityKind::Location;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("name", "Name"),
            ColumnDef::new("address", "Address"),
            ColumnDef::new("notes", "Notes"),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        require_text(ValidationResult::valid(), "name", &self.name, "Name is required")
    }
}
