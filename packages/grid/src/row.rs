//! Grid rows and their identifiers

use chrono::Utc;
use furrow_common::{RemoteError, RemoteResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicI64, Ordering};

/// Numeric row identifier: persisted rows are `>= 0`, unsaved rows `< 0`
pub type RowId = i64;

/// Entities that carry a server-assigned identifier
pub trait Identified {
    fn id(&self) -> Option<RowId>;

    fn assign_id(&mut self, id: RowId);
}

impl Identified for Value {
    fn id(&self) -> Option<RowId> {
        self.get("id").and_then(Value::as_i64)
    }

    fn assign_id(&mut self, id: RowId) {
        if let Value::Object(map) = self {
            map.insert("id".to_string(), Value::from(id));
        }
    }
}

static LAST_SYNTHETIC: AtomicI64 = AtomicI64::new(0);

/// Placeholder id for a row that has not been persisted yet.
///
/// Derived from the clock, and strictly decreasing so two rows added within
/// the same tick never collide.
pub fn synthetic_id() -> RowId {
    let now = -Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or(i64::MAX)
        .saturating_abs()
        .max(1);

    let next = |last: RowId| now.min(last.saturating_sub(1));
    match LAST_SYNTHETIC.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last))) {
        Ok(previous) | Err(previous) => next(previous),
    }
}

/// One row as the grid holds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditableRow<T> {
    pub id: RowId,
    pub is_new: bool,
    pub values: T,
}

impl<T: Identified> EditableRow<T> {
    /// Wrap a value the server returned; it must carry an id
    pub fn persisted(values: T, operation: &'static str) -> RemoteResult<Self> {
        let id = values
            .id()
            .ok_or(RemoteError::MissingIdentifier { operation })?;

        Ok(Self {
            id,
            is_new: false,
            values,
        })
    }
}

impl<T> EditableRow<T> {
    /// A fresh local row under a synthetic id
    pub fn unsaved(values: T) -> Self {
        Self {
            id: synthetic_id(),
            is_new: true,
            values,
        }
    }

    /// Has this row never reached the store?
    pub fn is_synthetic(&self) -> bool {
        self.id < 0
    }
}
