use serde::{Deserialize, Serialize};

/// A grid column bound to one entity field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Dot path of the field
    pub field: String,

    /// Display label (already translated)
    pub label: String,

    #[serde(default = "default_editable")]
    pub editable: bool,
}

fn default_editable() -> bool {
    true
}

impl ColumnDef {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            label: label.into(),
            editable: true,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }
}

/// Label for `field`, falling back to the field path itself
pub fn label_for<'a>(columns: &'a [ColumnDef], field: &'a str) -> &'a str {
    columns
        .iter()
        .find(|column| column.field == field)
        .map_or(field, |column| column.label.as_str())
}

pub fn is_editable(columns: &[ColumnDef], field: &str) -> bool {
    columns
        .iter()
        .any(|column| column.field == field && column.editable)
}

pub fn first_editable(columns: &[ColumnDef]) -> Option<&str> {
    columns
        .iter()
        .find(|column| column.editable)
        .map(|column| column.field.as_str())
}
