use crate::kind::{identified, require_text, EntityKind, GridEntity};
use chrono::NaiveDate;
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, RowId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    #[default]
    Open,
    InProgress,
    Done,
}

/// Field work, optionally tied to a planting plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RowId>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub planting_plan_id: Option<RowId>,
}

identified!(Task);

impl GridEntity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("title", "Title"),
            ColumnDef::new("dueDate", "Due"),
            ColumnDef::new("status", "Status"),
            ColumnDef::new("description", "Description"),
            ColumnDef::new("plantingPlanId", "Planting plan"),
            ColumnDef::new("id", "ID").read_only(),
        ]
    }

    fn validate(&self) -> ValidationResult {
        require_text(ValidationResult::valid(), "title", &self.title, "Title is required")
    }
}
