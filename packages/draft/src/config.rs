use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Draft machine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveConfig {
    /// Show validation errors from the first render instead of after the
    /// first save attempt
    #[serde(default)]
    pub show_errors_immediately: bool,

    /// Quiet period before a debounced save fires
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Undo levels kept by the edit history (0 = unlimited)
    #[serde(default = "default_history_levels")]
    pub history_levels: usize,

    /// When the page-unload guard is armed
    #[serde(default)]
    pub unload_policy: UnloadPolicy,
}

/// Predicate arming the page-unload guard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnloadPolicy {
    /// Only warn when there is something save-worthy to lose
    #[default]
    DirtyAndValid,

    /// Warn for any unsaved edit, valid or not
    Dirty,
}

impl UnloadPolicy {
    pub fn should_guard(self, dirty: bool, valid: bool) -> bool {
        match self {
            UnloadPolicy::DirtyAndValid => dirty && valid,
            UnloadPolicy::Dirty => dirty,
        }
    }
}

fn default_debounce_ms() -> u64 {
    800
}

fn default_history_levels() -> usize {
    100
}

impl AutosaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            show_errors_immediately: false,
            debounce_ms: default_debounce_ms(),
            history_levels: default_history_levels(),
            unload_policy: UnloadPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let json = r#"{ "showErrorsImmediately": true }"#;

        let config: AutosaveConfig = serde_json::from_str(json).unwrap();
        assert!(config.show_errors_immediately);
        assert_eq!(config.debounce_ms, 800);
        assert_eq!(config.history_levels, 100);
        assert_eq!(config.unload_policy, UnloadPolicy::DirtyAndValid);
    }

    #[test]
    fn test_unload_policies() {
        assert!(UnloadPolicy::DirtyAndValid.should_guard(true, true));
        assert!(!UnloadPolicy::DirtyAndValid.should_guard(true, false));
        assert!(!UnloadPolicy::DirtyAndValid.should_guard(false, true));
        assert!(UnloadPolicy::Dirty.should_guard(true, false));

        let policy: UnloadPolicy = serde_json::from_str("\"dirty\"").unwrap();
        assert_eq!(policy, UnloadPolicy::Dirty);
    }

    #[test]
    fn test_debounce_duration() {
        let config = AutosaveConfig {
            debounce_ms: 250,
            ..AutosaveConfig::default()
        };
        assert_eq!(config.debounce(), Duration::from_millis(250));
    }
}
