//! Persister contract and save reasons

use async_trait::async_trait;
use furrow_common::RemoteResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What triggered a save attempt.
///
/// Passed through to the persister untouched; the machine only uses it for
/// logging and to decide whether the attempt came from a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveReason {
    Blur,
    Debounced,
    Manual,
    BeforeUnload,
    RouteChange,
}

impl SaveReason {
    /// Attempts triggered by leaving the page or the route
    pub fn is_navigation(self) -> bool {
        matches!(self, SaveReason::BeforeUnload | SaveReason::RouteChange)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SaveReason::Blur => "blur",
            SaveReason::Debounced => "debounced",
            SaveReason::Manual => "manual",
            SaveReason::BeforeUnload => "beforeunload",
            SaveReason::RouteChange => "routechange",
        }
    }
}

impl fmt::Display for SaveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote persistence for one entity.
///
/// Resolves to the canonical, server-confirmed value. The machine never
/// retries, and ignores results from attempts that were superseded.
#[async_trait]
pub trait Persister<T>: Send + Sync {
    async fn persist(&self, draft: T, reason: SaveReason) -> RemoteResult<T>;
}
