//! # Row Commit Protocol
//!
//! Maps grid interaction events onto row edits and store calls, and keeps
//! the row list in step with create/update/delete outcomes.
//!
//! ## Row transitions
//!
//! ```text
//!            click editable cell
//!   view ───────────────────────────→ edit
//!    ↑  ←── blur / tab / enter ────   │   (validate, then create or update)
//!    └───── escape ───────────────────┘   (revert, no save)
//! ```
//!
//! The controller owns the row list outright. Callers read it through
//! [`GridController::rows`] and the selection listener; they never mutate it.

use crate::columns::{first_editable, is_editable};
use crate::config::{GridConfig, InvalidCommitPolicy};
use crate::errors::{describe_remote_error, describe_validation_errors, GridError};
use crate::modes::{RowMode, RowModesModel};
use crate::row::{EditableRow, Identified, RowId};
use crate::store::RowStore;
use furrow_common::{Entity, RemoteError};
use furrow_draft::{apply_field, BlockReason, Confirm, NavigationState, RouteGuard, Validator};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Why a row is leaving edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Blur,
    Tab,
    Enter,
    Escape,
}

impl StopReason {
    /// Every reason except Escape commits
    pub fn commits(self) -> bool {
        !matches!(self, StopReason::Escape)
    }
}

/// Result of leaving edit mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Escape: edits discarded, nothing sent
    Cancelled,

    /// Nothing changed on a persisted row, nothing sent
    Unchanged,

    /// Stored; `id` is the row's identifier from now on
    Saved { id: RowId },

    /// Validation failed; `editing` tells whether the row stayed in edit mode
    Invalid { editing: bool },

    /// The store refused; the row stays in edit mode
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    Failed,
}

pub type SelectionListener<T> = Box<dyn Fn(&[EditableRow<T>]) + Send + Sync>;

pub struct GridController<T: Entity> {
    rows: Vec<EditableRow<T>>,
    modes: RowModesModel,

    /// Row values as they were when edit mode began
    originals: HashMap<RowId, T>,

    error: Option<String>,
    loaded: bool,
    selection: Vec<RowId>,

    store: Arc<dyn RowStore<T>>,
    validator: Box<dyn Validator<T>>,
    confirm: Box<dyn Confirm>,
    route_guard: RouteGuard,
    on_selection_change: Option<SelectionListener<T>>,
    config: GridConfig,
}

impl<T> GridController<T>
where
    T: Entity + Identified + Default,
{
    pub fn new<S, V, C>(store: Arc<S>, validator: V, confirm: C, config: GridConfig) -> Self
    where
        S: RowStore<T> + 'static,
        V: Validator<T> + 'static,
        C: Confirm + 'static,
    {
        Self {
            rows: Vec::new(),
            modes: RowModesModel::new(),
            originals: HashMap::new(),
            error: None,
            loaded: false,
            selection: Vec::new(),
            store,
            validator: Box::new(validator),
            confirm: Box::new(confirm),
            route_guard: RouteGuard::new(config.messages.clone()),
            on_selection_change: None,
            config,
        }
    }

    pub fn on_selection_change(
        mut self,
        listener: impl Fn(&[EditableRow<T>]) + Send + Sync + 'static,
    ) -> Self {
        self.on_selection_change = Some(Box::new(listener));
        self
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Fetch the row collection, once per controller.
    ///
    /// Returns `Ok(false)` when a load already happened. A failed load is
    /// not retried automatically.
    pub async fn load(&mut self) -> Result<bool, GridError> {
        if self.loaded {
            return Ok(false);
        }
        self.loaded = true;

        let listing = match self.store.list().await {
            Ok(listing) => listing,
            Err(error) => return Err(self.fail(error)),
        };

        let rows = listing
            .results
            .into_iter()
            .map(|values| EditableRow::persisted(values, "list"))
            .collect::<Result<Vec<_>, _>>();

        match rows {
            Ok(rows) => {
                tracing::info!(rows = rows.len(), "grid loaded");
                self.rows = rows;
                Ok(true)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Click on a cell. Enters edit mode when the column is editable and
    /// the row is not already editing.
    pub fn cell_click(&mut self, id: RowId, field: &str) -> bool {
        if !is_editable(&self.config.columns, field) || self.modes.is_editing(id) {
            return false;
        }
        let Some(row) = self.row(id) else {
            return false;
        };

        let original = row.values.clone();
        self.originals.insert(id, original);
        self.modes.start_edit(id, Some(field.to_string()));
        tracing::debug!(row = id, field, "row entered edit mode");
        true
    }

    /// Write a cell value into a row that is in edit mode
    pub fn edit_cell(&mut self, id: RowId, field: &str, value: Value) -> Result<(), GridError> {
        if !self.modes.is_editing(id) {
            return Err(GridError::NotEditing(id));
        }
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(GridError::UnknownRow(id))?;

        let (values, _) = apply_field(&row.values, field, &value)?;
        row.values = values;
        Ok(())
    }

    /// Leave edit mode. Escape reverts; every other reason commits.
    pub async fn stop_edit(&mut self, id: RowId, reason: StopReason) -> Result<CommitOutcome, GridError> {
        if !self.modes.is_editing(id) {
            return Err(GridError::NotEditing(id));
        }
        let index = self.index_of(id)?;

        if !reason.commits() {
            if let Some(original) = self.originals.remove(&id) {
                self.rows[index].values = original;
            }
            self.modes.stop_edit(id);
            tracing::debug!(row = id, "edit cancelled");
            return Ok(CommitOutcome::Cancelled);
        }

        self.commit_row(index, reason).await
    }

    async fn commit_row(&mut self, index: usize, reason: StopReason) -> Result<CommitOutcome, GridError> {
        let row = self.rows[index].clone();

        let verdict = self.validator.validate(&row.values);
        if !verdict.is_valid {
            self.error = Some(describe_validation_errors(&verdict.errors, &self.config.columns));
            tracing::debug!(row = row.id, ?reason, "commit blocked by validation");

            return Ok(match self.config.invalid_commit {
                InvalidCommitPolicy::KeepEditing => CommitOutcome::Invalid { editing: true },
                InvalidCommitPolicy::ExitToView => {
                    self.modes.stop_edit(row.id);
                    self.originals.remove(&row.id);
                    CommitOutcome::Invalid { editing: false }
                }
            });
        }

        if !row.is_new && self.originals.get(&row.id) == Some(&row.values) {
            self.finish_edit(row.id);
            return Ok(CommitOutcome::Unchanged);
        }

        let (operation, result) = if row.is_synthetic() {
            ("create", self.store.create(&row.values).await)
        } else {
            ("update", self.store.update(row.id, &row.values).await)
        };

        let saved = match result.and_then(|values| EditableRow::persisted(values, operation)) {
            Ok(saved) => saved,
            Err(error) if error.is_protocol_violation() => {
                return Err(self.fail(error));
            }
            Err(error) => {
                self.fail(error);
                return Ok(CommitOutcome::Failed);
            }
        };

        // The list may have been reshuffled while the call was out
        let index = self.index_of(row.id)?;
        let new_id = saved.id;
        self.rows[index] = saved;
        self.finish_edit(row.id);
        if new_id != row.id {
            self.rekey_selection(row.id, new_id);
        }
        self.error = None;

        tracing::info!(row = new_id, operation, "row committed");
        Ok(CommitOutcome::Saved { id: new_id })
    }

    fn finish_edit(&mut self, id: RowId) {
        self.modes.remove(id);
        self.originals.remove(&id);
    }

    /// Prepend a new unsaved row in edit mode, focused on the first
    /// editable column
    pub fn add_row(&mut self) -> RowId {
        let row = EditableRow::unsaved(T::default());
        let id = row.id;

        self.originals.insert(id, row.values.clone());
        self.rows.insert(0, row);
        self.modes
            .start_edit(id, first_editable(&self.config.columns).map(str::to_string));

        tracing::debug!(row = id, "row added");
        id
    }

    /// Delete a row after confirmation.
    ///
    /// Unsaved rows are dropped locally; persisted rows are removed only once
    /// the store confirms.
    pub async fn delete_row(&mut self, id: RowId) -> Result<DeleteOutcome, GridError> {
        let index = self.index_of(id)?;
        if !self.confirm.confirm(&self.config.messages.confirm_delete) {
            return Ok(DeleteOutcome::Declined);
        }

        if !self.rows[index].is_synthetic() {
            if let Err(error) = self.store.delete(id).await {
                self.fail(error);
                return Ok(DeleteOutcome::Failed);
            }
            tracing::info!(row = id, "row deleted");
        }

        let index = self.index_of(id)?;
        self.rows.remove(index);
        self.finish_edit(id);
        if self.selection.contains(&id) {
            self.selection.retain(|selected| *selected != id);
            self.notify_selection();
        }
        Ok(DeleteOutcome::Deleted)
    }

    // ------------------------------------------------------------------
    // Selection and navigation
    // ------------------------------------------------------------------

    /// Replace the selection and notify the listener with the selected rows
    pub fn select(&mut self, ids: &[RowId]) {
        self.selection = ids
            .iter()
            .copied()
            .filter(|id| self.rows.iter().any(|row| row.id == *id))
            .collect();
        self.notify_selection();
    }

    fn rekey_selection(&mut self, old: RowId, new: RowId) {
        let mut changed = false;
        for selected in self.selection.iter_mut().filter(|selected| **selected == old) {
            *selected = new;
            changed = true;
        }
        if changed {
            self.notify_selection();
        }
    }

    fn notify_selection(&self) {
        if let Some(listener) = &self.on_selection_change {
            let selected: Vec<EditableRow<T>> = self
                .rows
                .iter()
                .filter(|row| self.selection.contains(&row.id))
                .cloned()
                .collect();
            listener(&selected);
        }
    }

    /// Ask before an in-app route change; `true` means go ahead
    pub fn allow_navigation(&self) -> bool {
        self.route_guard.allow_navigation(self, self.confirm.as_ref())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn rows(&self) -> &[EditableRow<T>] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&EditableRow<T>> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn mode(&self, id: RowId) -> RowMode {
        self.modes.mode(id)
    }

    pub fn modes(&self) -> &RowModesModel {
        &self.modes
    }

    pub fn selection(&self) -> &[RowId] {
        &self.selection
    }

    /// Most recent operation's error
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn index_of(&self, id: RowId) -> Result<usize, GridError> {
        self.rows
            .iter()
            .position(|row| row.id == id)
            .ok_or(GridError::UnknownRow(id))
    }

    /// Put a remote failure in the error slot and hand it back
    fn fail(&mut self, error: RemoteError) -> GridError {
        if error.is_protocol_violation() {
            tracing::error!(%error, "store protocol violation");
        } else {
            tracing::warn!(%error, "grid operation failed");
        }
        self.error = Some(describe_remote_error(
            &error,
            &self.config.columns,
            &self.config.fallback_error,
        ));
        GridError::Remote(error)
    }
}

impl<T> NavigationState for GridController<T>
where
    T: Entity + Identified + Default,
{
    fn pending_block(&self) -> Option<BlockReason> {
        let editing = self.modes.editing_rows();
        let invalid_edit = editing.iter().any(|id| {
            self.row(*id)
                .is_some_and(|row| !self.validator.validate(&row.values).is_valid)
        });

        if invalid_edit || self.error.is_some() {
            Some(BlockReason::ValidationErrors)
        } else if !editing.is_empty() {
            Some(BlockReason::UnsavedChanges)
        } else {
            None
        }
    }
}

impl<T: Entity> fmt::Debug for GridController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridController")
            .field("rows", &self.rows.len())
            .field("editing", &self.modes.editing_rows())
            .field("error", &self.error)
            .field("loaded", &self.loaded)
            .finish()
    }
}
