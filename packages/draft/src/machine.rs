//! # Draft State Machine
//!
//! Owns the working copy of one entity, the last value known to be saved,
//! recorded validation errors and the gated save.
//!
//! ## Lifecycle
//!
//! ```text
//! initialize → set_field / update_fields → save_if_valid → commit
//!      ↓              ↓                         ↓             ↓
//!  draft = saved    dirty              validate, persist   draft = saved
//! ```
//!
//! All mutation is synchronous and happens under one lock. The only
//! suspension point is the persister call; its result is applied only if the
//! attempt still owns the outcome (see [`SaveCoordinator`]).

use crate::apply::{apply_field, ensure_written};
use crate::config::AutosaveConfig;
use crate::coordinator::{SaveCoordinator, SaveTicket};
use crate::errors::DraftError;
use crate::history::{EditHistory, FieldEdit};
use crate::navigation::{BlockReason, NavigationState};
use crate::persist::{Persister, SaveReason};
use crate::unload::{LifecycleEvents, UnloadGuard};
use crate::validation::{FieldErrors, ValidationResult, Validator};
use furrow_common::{get_path, merge_top_level, Entity, PathError, RemoteError};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

pub type SaveSuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type SaveErrorCallback = Arc<dyn Fn(&RemoteError) + Send + Sync>;

/// Construction options for a [`DraftMachine`]
pub struct DraftOptions<T> {
    pub config: AutosaveConfig,
    on_save_success: Option<SaveSuccessCallback<T>>,
    on_save_error: Option<SaveErrorCallback>,
    unload_events: Option<Arc<dyn LifecycleEvents>>,
    unload_message: Option<String>,
}

impl<T> DraftOptions<T> {
    pub fn new(config: AutosaveConfig) -> Self {
        Self {
            config,
            on_save_success: None,
            on_save_error: None,
            unload_events: None,
            unload_message: None,
        }
    }

    pub fn show_errors_immediately(mut self, show: bool) -> Self {
        self.config.show_errors_immediately = show;
        self
    }

    /// Called with the canonical value after a winning save
    pub fn on_save_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_save_success = Some(Arc::new(callback));
        self
    }

    /// Called with the rejection after a winning save fails
    pub fn on_save_error(mut self, callback: impl Fn(&RemoteError) + Send + Sync + 'static) -> Self {
        self.on_save_error = Some(Arc::new(callback));
        self
    }

    /// Arm a "confirm before leaving" guard on this event source
    pub fn unload_events(mut self, events: Arc<dyn LifecycleEvents>) -> Self {
        self.unload_events = Some(events);
        self
    }

    pub fn unload_message(mut self, message: impl Into<String>) -> Self {
        self.unload_message = Some(message.into());
        self
    }
}

impl<T> Default for DraftOptions<T> {
    fn default() -> Self {
        Self::new(AutosaveConfig::default())
    }
}

struct PendingDebounce {
    id: u64,
    handle: AbortHandle,
}

struct DraftState<T> {
    draft: T,
    saved: T,
    errors: FieldErrors,
    show_errors: bool,
    is_saving: bool,
    coordinator: SaveCoordinator,
    debounce: Option<PendingDebounce>,
    history: EditHistory,
    unload_guard: Option<UnloadGuard>,
    torn_down: bool,
}

/// Draft/saved pair for one edited entity
pub struct DraftMachine<T: Entity> {
    state: Mutex<DraftState<T>>,
    validator: Box<dyn Validator<T>>,
    persister: Arc<dyn Persister<T>>,
    options: DraftOptions<T>,
    debounce_seq: AtomicU64,
}

impl<T: Entity> DraftMachine<T> {
    pub fn new<V, P>(initial: T, validator: V, persister: Arc<P>, options: DraftOptions<T>) -> Self
    where
        V: Validator<T> + 'static,
        P: Persister<T> + 'static,
    {
        let errors = if options.config.show_errors_immediately {
            validator.validate(&initial).errors
        } else {
            FieldErrors::new()
        };

        let state = DraftState {
            draft: initial.clone(),
            saved: initial,
            errors,
            show_errors: options.config.show_errors_immediately,
            is_saving: false,
            coordinator: SaveCoordinator::new(),
            debounce: None,
            history: EditHistory::with_max_levels(options.config.history_levels),
            unload_guard: None,
            torn_down: false,
        };

        Self {
            state: Mutex::new(state),
            validator: Box::new(validator),
            persister,
            options,
            debounce_seq: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, DraftState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Start editing a (possibly different) entity.
    ///
    /// Replaces both draft and saved snapshot, supersedes any in-flight save
    /// and resets error visibility to the configured default. With
    /// `show_errors_immediately` the initial value's errors are recorded
    /// right away.
    pub fn initialize(&self, initial: T) {
        let mut state = self.state();
        if let Some(ticket) = state.coordinator.cancel() {
            tracing::debug!(generation = ticket.generation(), "save superseded by initialize");
        }
        Self::cancel_debounce(&mut state);

        state.errors = if self.options.config.show_errors_immediately {
            self.validator.validate(&initial).errors
        } else {
            FieldErrors::new()
        };
        state.draft = initial.clone();
        state.saved = initial;
        state.show_errors = self.options.config.show_errors_immediately;
        state.is_saving = false;
        state.history.clear();
        state.torn_down = false;
        self.sync_unload_guard(&mut state);
    }

    /// Deep-set a dot path in the draft.
    ///
    /// Clears a recorded error for exactly this path without re-running
    /// validation. An edit the entity type cannot represent, including a
    /// path it has no field for, is rejected and leaves the draft, errors and
    /// history untouched.
    pub fn set_field(&self, path: &str, value: Value) -> Result<(), DraftError> {
        let mut state = self.state();

        let (draft, before) = apply_field(&state.draft, path, &value)?;
        state.draft = draft;

        if state.errors.remove(path).is_some() {
            tracing::debug!(path, "cleared field error on edit");
        }
        state.history.record(FieldEdit {
            path: path.to_string(),
            before,
            after: value,
        });
        self.sync_unload_guard(&mut state);

        Ok(())
    }

    /// Shallow-merge top-level keys into the draft
    pub fn update_fields(&self, partial: Map<String, Value>) -> Result<(), DraftError> {
        let mut state = self.state();

        let mut doc = serde_json::to_value(&state.draft)?;
        let previous = merge_top_level(&mut doc, partial);
        let edits: Vec<FieldEdit> = previous
            .into_iter()
            .map(|(path, before)| {
                let after = get_path(&doc, &path).cloned().unwrap_or(Value::Null);
                FieldEdit {
                    path,
                    before,
                    after,
                }
            })
            .collect();
        let draft: T = serde_json::from_value(doc)?;
        for edit in &edits {
            ensure_written(&draft, &edit.path, &edit.after)?;
        }
        state.draft = draft;

        state.history.record_all(edits);
        self.sync_unload_guard(&mut state);

        Ok(())
    }

    /// Replace the draft only; the saved snapshot stays
    pub fn replace_draft(&self, value: T) {
        let mut state = self.state();
        state.draft = value;
        state.history.clear();
        self.sync_unload_guard(&mut state);
    }

    /// Throw away edits and hide errors.
    ///
    /// A save still in flight no longer owns its outcome.
    pub fn reset_to_saved(&self) {
        let mut state = self.state();
        if let Some(ticket) = state.coordinator.cancel() {
            tracing::debug!(generation = ticket.generation(), "save superseded by reset");
        }
        Self::cancel_debounce(&mut state);
        state.is_saving = false;
        state.draft = state.saved.clone();
        state.errors.clear();
        state.show_errors = false;
        state.history.clear();
        self.sync_unload_guard(&mut state);
    }

    /// Adopt canonical data that arrived outside this machine's own saves.
    ///
    /// Supersedes any in-flight save so its late result cannot overwrite the
    /// adopted value.
    pub fn commit_saved(&self, server_value: T) {
        let mut state = self.state();
        if let Some(ticket) = state.coordinator.cancel() {
            tracing::debug!(generation = ticket.generation(), "save superseded by commit_saved");
        }
        Self::cancel_debounce(&mut state);
        state.is_saving = false;
        state.draft = server_value.clone();
        state.saved = server_value;
        state.errors.clear();
        state.history.clear();
        self.sync_unload_guard(&mut state);
    }

    /// Revert the newest edit batch.
    ///
    /// History and draft move together: if the reverted document no longer
    /// fits `T`, neither changes.
    pub fn undo(&self) -> Result<bool, DraftError> {
        self.step_history(EditHistory::undo)
    }

    pub fn redo(&self) -> Result<bool, DraftError> {
        self.step_history(EditHistory::redo)
    }

    fn step_history(
        &self,
        step: impl FnOnce(&mut EditHistory, &mut Value) -> Result<bool, PathError>,
    ) -> Result<bool, DraftError> {
        let mut state = self.state();
        let mut history = state.history.clone();
        let mut doc = serde_json::to_value(&state.draft)?;
        if !step(&mut history, &mut doc)? {
            return Ok(false);
        }

        state.draft = serde_json::from_value(doc)?;
        state.history = history;
        self.sync_unload_guard(&mut state);
        Ok(true)
    }

    /// Group the following field edits into one undo step
    pub fn begin_batch(&self) {
        self.state().history.begin_batch();
    }

    pub fn end_batch(&self) {
        self.state().history.end_batch();
    }

    // ------------------------------------------------------------------
    // Validation and saving
    // ------------------------------------------------------------------

    /// Validate the current draft; visibility is left alone
    pub fn validate_now(&self) -> ValidationResult {
        let state = self.state();
        self.validator.validate(&state.draft)
    }

    /// Validate and, when valid and dirty, persist the current draft.
    ///
    /// Returns `true` when the draft is saved (including "nothing to save")
    /// and `false` when it is invalid, the persister failed, or this attempt
    /// was superseded before it finished.
    pub async fn save_if_valid(&self, reason: SaveReason) -> bool {
        let (ticket, submitted) = {
            let mut state = self.state();
            if state.torn_down {
                tracing::debug!(%reason, "save ignored after teardown");
                return false;
            }

            Self::cancel_debounce(&mut state);
            let (ticket, superseded) = state.coordinator.begin();
            if let Some(old) = superseded {
                tracing::debug!(generation = old.generation(), %reason, "in-flight save superseded");
            }
            state.is_saving = false;

            let ValidationResult { is_valid, errors } = self.validator.validate(&state.draft);
            state.errors = errors;
            state.show_errors = true;

            if !is_valid {
                state.coordinator.settle(&ticket);
                tracing::debug!(%reason, errors = state.errors.len(), "save blocked by validation");
                return false;
            }

            if state.draft == state.saved {
                state.coordinator.settle(&ticket);
                return true;
            }

            state.is_saving = true;
            (ticket, state.draft.clone())
        };

        if reason.is_navigation() {
            tracing::info!(generation = ticket.generation(), %reason, "saving before leaving");
        } else {
            tracing::debug!(generation = ticket.generation(), %reason, "persisting draft");
        }
        let outcome = self.persister.persist(submitted.clone(), reason).await;

        self.settle(ticket, submitted, outcome, reason)
    }

    fn settle(
        &self,
        ticket: SaveTicket,
        submitted: T,
        outcome: Result<T, RemoteError>,
        reason: SaveReason,
    ) -> bool {
        let mut state = self.state();
        if !state.coordinator.settle(&ticket) {
            tracing::debug!(generation = ticket.generation(), "discarding result of superseded save");
            return false;
        }
        state.is_saving = false;

        match outcome {
            Ok(canonical) => {
                if state.draft == submitted {
                    state.draft = canonical.clone();
                    state.history.clear();
                } else {
                    tracing::debug!("draft edited while saving, keeping newer edits");
                }
                state.saved = canonical.clone();
                state.errors.clear();
                self.sync_unload_guard(&mut state);
                drop(state);

                if let Some(callback) = &self.options.on_save_success {
                    callback(&canonical);
                }
                true
            }
            Err(error) => {
                tracing::warn!(%reason, %error, "save failed");
                drop(state);

                if let Some(callback) = &self.options.on_save_error {
                    callback(&error);
                }
                false
            }
        }
    }

    /// Save after the configured quiet period, restarting the timer if one
    /// is already pending.
    ///
    /// Needs a tokio runtime; returns `false` when none is available or the
    /// machine has been torn down.
    pub fn schedule_save(self: &Arc<Self>) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("debounced save requested outside a tokio runtime");
            return false;
        };

        let mut state = self.state();
        if state.torn_down {
            return false;
        }
        Self::cancel_debounce(&mut state);

        let id = self.debounce_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let delay = self.options.config.debounce();
        let machine = Arc::clone(self);

        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut state = machine.state();
                if state.debounce.as_ref().map(|pending| pending.id) != Some(id) {
                    return;
                }
                state.debounce = None;
            }
            machine.save_if_valid(SaveReason::Debounced).await;
        });

        state.debounce = Some(PendingDebounce {
            id,
            handle: task.abort_handle(),
        });
        true
    }

    /// Stop all outstanding work: late save results are dropped, the
    /// debounce timer is cancelled and the unload guard removed
    pub fn teardown(&self) {
        let mut state = self.state();
        if let Some(ticket) = state.coordinator.cancel() {
            tracing::debug!(generation = ticket.generation(), "save abandoned on teardown");
        }
        Self::cancel_debounce(&mut state);
        state.is_saving = false;
        state.torn_down = true;
        state.unload_guard = None;
    }

    fn cancel_debounce(state: &mut DraftState<T>) {
        if let Some(pending) = state.debounce.take() {
            pending.handle.abort();
        }
    }

    fn sync_unload_guard(&self, state: &mut DraftState<T>) {
        let Some(events) = &self.options.unload_events else {
            return;
        };

        let dirty = state.draft != state.saved;
        let valid = dirty && self.validator.validate(&state.draft).is_valid;
        let armed = !state.torn_down && self.options.config.unload_policy.should_guard(dirty, valid);

        match (armed, state.unload_guard.is_some()) {
            (true, false) => {
                state.unload_guard = Some(UnloadGuard::install(
                    Arc::clone(events),
                    self.options.unload_message.clone(),
                ));
            }
            (false, true) => state.unload_guard = None,
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub fn draft(&self) -> T {
        self.state().draft.clone()
    }

    pub fn saved(&self) -> T {
        self.state().saved.clone()
    }

    pub fn is_dirty(&self) -> bool {
        let state = self.state();
        state.draft != state.saved
    }

    pub fn is_saving(&self) -> bool {
        self.state().is_saving
    }

    /// Recorded errors, regardless of visibility
    pub fn errors(&self) -> FieldErrors {
        self.state().errors.clone()
    }

    /// Errors the UI should display right now
    pub fn visible_errors(&self) -> FieldErrors {
        let state = self.state();
        if state.show_errors {
            state.errors.clone()
        } else {
            FieldErrors::new()
        }
    }

    pub fn errors_visible(&self) -> bool {
        self.state().show_errors
    }

    pub fn has_unload_guard(&self) -> bool {
        self.state().unload_guard.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.state().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state().history.can_redo()
    }
}

impl<T: Entity> NavigationState for DraftMachine<T> {
    fn pending_block(&self) -> Option<BlockReason> {
        let state = self.state();
        if state.draft == state.saved {
            return None;
        }
        if self.validator.validate(&state.draft).is_valid {
            Some(BlockReason::UnsavedChanges)
        } else {
            Some(BlockReason::ValidationErrors)
        }
    }
}

impl<T: Entity> fmt::Debug for DraftMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("DraftMachine")
            .field("dirty", &(state.draft != state.saved))
            .field("saving", &state.is_saving)
            .field("errors", &state.errors)
            .field("torn_down", &state.torn_down)
            .finish()
    }
}
