//! Per-row view/edit state

use crate::row::RowId;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowMode {
    #[default]
    View,
    Edit {
        /// Cell that should receive input focus
        field_to_focus: Option<String>,
    },
}

impl RowMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, RowMode::Edit { .. })
    }
}

/// Row id → mode. Rows without an entry are in view mode.
#[derive(Debug, Clone, Default)]
pub struct RowModesModel {
    modes: HashMap<RowId, RowMode>,
}

impl RowModesModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self, id: RowId) -> RowMode {
        self.modes.get(&id).cloned().unwrap_or_default()
    }

    pub fn is_editing(&self, id: RowId) -> bool {
        self.modes.get(&id).is_some_and(RowMode::is_edit)
    }

    /// Enter edit mode; a row already editing is left as is
    pub fn start_edit(&mut self, id: RowId, field_to_focus: Option<String>) -> bool {
        if self.is_editing(id) {
            return false;
        }
        self.modes.insert(id, RowMode::Edit { field_to_focus });
        true
    }

    /// Back to view mode; `false` if the row was not editing
    pub fn stop_edit(&mut self, id: RowId) -> bool {
        matches!(self.modes.insert(id, RowMode::View), Some(RowMode::Edit { .. }))
    }

    /// Forget a row entirely (deleted or re-keyed)
    pub fn remove(&mut self, id: RowId) {
        self.modes.remove(&id);
    }

    pub fn editing_rows(&self) -> Vec<RowId> {
        let mut ids: Vec<RowId> = self
            .modes
            .iter()
            .filter(|(_, mode)| mode.is_edit())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn any_editing(&self) -> bool {
        self.modes.values().any(RowMode::is_edit)
    }
}
