use furrow_common::Entity;
use furrow_draft::ValidationResult;
use furrow_grid::{ColumnDef, Identified};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity collections a grid can edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Location,
    Field,
    Bed,
    Culture,
    PlantingPlan,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Location,
        EntityKind::Field,
        EntityKind::Bed,
        EntityKind::Culture,
        EntityKind::PlantingPlan,
        EntityKind::Task,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Location => "location",
            EntityKind::Field => "field",
            EntityKind::Bed => "bed",
            EntityKind::Culture => "culture",
            EntityKind::PlantingPlan => "plantingPlan",
            EntityKind::Task => "task",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity that can be edited row by row in a grid
pub trait GridEntity: Entity + Identified + Default {
    const KIND: EntityKind;

    /// Column layout, editable columns first in tab order
    fn columns() -> Vec<ColumnDef>;

    fn validate(&self) -> ValidationResult;

    /// Fields the server derives on write
    fn canonicalize(&mut self) {}
}

/// Record `message` under `field` when `value` is blank
pub(crate) fn require_text(
    result: ValidationResult,
    field: &str,
    value: &str,
    message: &str,
) -> ValidationResult {
    if value.trim().is_empty() {
        result.with_error(field, message)
    } else {
        result
    }
}

/// Implements `Identified` for structs with an `id: Option<RowId>` field
macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl furrow_grid::Identified for $ty {
                fn id(&self) -> Option<furrow_grid::RowId> {
                    self.id
                }

                fn assign_id(&mut self, id: furrow_grid::RowId) {
                    self.id = Some(id);
                }
            }
        )*
    };
}

pub(crate) use identified;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_serde() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::from(kind.as_str()));
        }
    }

    #[test]
    fn test_require_text() {
        let result = require_text(ValidationResult::valid(), "name", "  ", "Name is required");
        assert_eq!(result.error("name"), Some("Name is required"));

        let result = require_text(ValidationResult::valid(), "name", "Kale", "Name is required");
        assert!(result.is_valid);
    }
}
