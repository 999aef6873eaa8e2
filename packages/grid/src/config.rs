use crate::columns::ColumnDef;
use furrow_draft::GuardMessages;
use serde::{Deserialize, Serialize};

/// What a commit does with a row that fails validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidCommitPolicy {
    /// Row stays in edit mode with the error showing
    #[default]
    KeepEditing,

    /// Row returns to view mode; the error banner stays
    ExitToView,
}

/// Grid settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default)]
    pub invalid_commit: InvalidCommitPolicy,

    /// Shown when a failure carries no per-field detail
    #[serde(default = "default_fallback_error")]
    pub fallback_error: String,

    #[serde(default)]
    pub messages: GuardMessages,

    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

fn default_fallback_error() -> String {
    "Something went wrong while saving. Please try again.".to_string()
}

impl GridConfig {
    pub fn with_columns(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn invalid_commit(mut self, policy: InvalidCommitPolicy) -> Self {
        self.invalid_commit = policy;
        self
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            invalid_commit: InvalidCommitPolicy::default(),
            fallback_error: default_fallback_error(),
            messages: GuardMessages::default(),
            columns: Vec::new(),
        }
    }
}
