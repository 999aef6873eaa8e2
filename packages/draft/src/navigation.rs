//! # In-App Navigation Guard
//!
//! Stricter sibling of the unload guard: a route change is held up while
//! anything would be lost, valid or not, because an in-app navigation has no
//! browser dialog to fall back on. Blocking is advisory; the user can always
//! confirm and leave.

use serde::{Deserialize, Serialize};

/// Why a navigation would lose work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// Edits exist and would pass validation
    UnsavedChanges,

    /// Edits exist that would not pass validation, or an error is showing
    ValidationErrors,
}

/// Anything that can hold work a navigation would discard
pub trait NavigationState {
    fn pending_block(&self) -> Option<BlockReason>;
}

/// Blocking yes/no question put to the user
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Prompt texts (already translated by the caller)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardMessages {
    #[serde(default = "default_unsaved_changes")]
    pub unsaved_changes: String,

    #[serde(default = "default_validation_errors")]
    pub validation_errors: String,

    #[serde(default = "default_confirm_delete")]
    pub confirm_delete: String,
}

fn default_unsaved_changes() -> String {
    "You have unsaved changes. Leave anyway?".to_string()
}

fn default_validation_errors() -> String {
    "Some entries are invalid and will be lost. Leave anyway?".to_string()
}

fn default_confirm_delete() -> String {
    "Delete this entry?".to_string()
}

impl Default for GuardMessages {
    fn default() -> Self {
        Self {
            unsaved_changes: default_unsaved_changes(),
            validation_errors: default_validation_errors(),
            confirm_delete: default_confirm_delete(),
        }
    }
}

impl GuardMessages {
    pub fn for_reason(&self, reason: BlockReason) -> &str {
        match reason {
            BlockReason::UnsavedChanges => &self.unsaved_changes,
            BlockReason::ValidationErrors => &self.validation_errors,
        }
    }
}

/// What the guard would ask before letting a navigation through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationPrompt {
    pub reason: BlockReason,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    messages: GuardMessages,
}

impl RouteGuard {
    pub fn new(messages: GuardMessages) -> Self {
        Self { messages }
    }

    /// Prompt to show, or `None` when leaving loses nothing
    pub fn prompt(&self, state: &dyn NavigationState) -> Option<NavigationPrompt> {
        state.pending_block().map(|reason| NavigationPrompt {
            reason,
            message: self.messages.for_reason(reason).to_string(),
        })
    }

    /// Ask for confirmation if needed; `true` means the navigation may proceed
    pub fn allow_navigation(&self, state: &dyn NavigationState, confirm: &dyn Confirm) -> bool {
        match self.prompt(state) {
            None => true,
            Some(prompt) => {
                let proceed = confirm.confirm(&prompt.message);
                tracing::debug!(reason = ?prompt.reason, proceed, "route change guarded");
                proceed
            }
        }
    }
}
