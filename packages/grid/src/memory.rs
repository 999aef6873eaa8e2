//! # In-Memory Store
//!
//! A `RowStore` that keeps rows in a vector. Used by the CLI replay command
//! and by tests; it assigns ids the way a server would and can compute
//! derived fields on write.

use crate::row::{Identified, RowId};
use crate::store::{Listing, RowStore};
use async_trait::async_trait;
use furrow_common::{RemoteError, RemoteResult};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Calls received, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List,
    Create,
    Update(RowId),
    Delete(RowId),
}

type Canonicalizer<T> = Box<dyn Fn(&mut T) + Send + Sync>;

struct Inner<T> {
    rows: Vec<T>,
    next_id: RowId,
    fail_next: Option<RemoteError>,
    calls: Vec<StoreCall>,
}

pub struct MemoryStore<T> {
    inner: Mutex<Inner<T>>,
    canonicalize: Option<Canonicalizer<T>>,
}

impl<T> MemoryStore<T>
where
    T: Identified + Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Seed with rows that already carry ids
    pub fn with_rows(rows: Vec<T>) -> Self {
        let next_id = rows
            .iter()
            .filter_map(Identified::id)
            .max()
            .map_or(1, |max| max + 1);

        Self {
            inner: Mutex::new(Inner {
                rows,
                next_id,
                fail_next: None,
                calls: Vec::new(),
            }),
            canonicalize: None,
        }
    }

    /// Compute server-side derived fields on every create/update
    pub fn with_canonicalizer(mut self, canonicalize: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        self.canonicalize = Some(Box::new(canonicalize));
        self
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: RemoteError) {
        self.inner().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner().calls.clone()
    }

    pub fn rows(&self) -> Vec<T> {
        self.inner().rows.clone()
    }

    fn inner(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Log the call and consume a pending injected failure
    fn enter(&self, call: StoreCall) -> RemoteResult<MutexGuard<'_, Inner<T>>> {
        let mut inner = self.inner();
        inner.calls.push(call);
        match inner.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(inner),
        }
    }

    fn canonical(&self, mut row: T, id: RowId) -> T {
        row.assign_id(id);
        if let Some(canonicalize) = &self.canonicalize {
            canonicalize(&mut row);
        }
        row
    }
}

impl<T> Default for MemoryStore<T>
where
    T: Identified + Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> RowStore<T> for MemoryStore<T>
where
    T: Identified + Clone + Send + Sync,
{
    async fn list(&self) -> RemoteResult<Listing<T>> {
        let inner = self.enter(StoreCall::List)?;
        Ok(Listing {
            results: inner.rows.clone(),
        })
    }

    async fn create(&self, data: &T) -> RemoteResult<T> {
        let mut inner = self.enter(StoreCall::Create)?;
        let id = inner.next_id;
        inner.next_id += 1;

        let row = self.canonical(data.clone(), id);
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: RowId, data: &T) -> RemoteResult<T> {
        let mut inner = self.enter(StoreCall::Update(id))?;
        let row = self.canonical(data.clone(), id);

        let slot = inner
            .rows
            .iter_mut()
            .find(|existing| existing.id() == Some(id))
            .ok_or_else(|| RemoteError::Generic(format!("No row with id {id}")))?;
        *slot = row.clone();
        Ok(row)
    }

    async fn delete(&self, id: RowId) -> RemoteResult<()> {
        let mut inner = self.enter(StoreCall::Delete(id))?;
        let before = inner.rows.len();
        inner.rows.retain(|row| row.id() != Some(id));

        if inner.rows.len() == before {
            return Err(RemoteError::Generic(format!("No row with id {id}")));
        }
        Ok(())
    }
}

impl<T> fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MemoryStore")
            .field("rows", &inner.rows.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = MemoryStore::with_rows(vec![json!({ "id": 7, "name": "Kale" })]);

        let created = store.create(&json!({ "name": "Chard" })).await.unwrap();
        assert_eq!(created.id(), Some(8));
        assert_eq!(store.rows().len(), 2);
        assert_eq!(store.calls(), vec![StoreCall::Create]);
    }

    #[tokio::test]
    async fn test_canonicalizer_runs_on_write() {
        let store = MemoryStore::<Value>::new().with_canonicalizer(|row| {
            let days = row["days"].as_i64().unwrap_or(0);
            row["weeks"] = json!(days / 7);
        });

        let created = store.create(&json!({ "days": 21 })).await.unwrap();
        assert_eq!(created["weeks"], json!(3));

        let updated = store.update(1, &json!({ "days": 70 })).await.unwrap();
        assert_eq!(updated, json!({ "id": 1, "days": 70, "weeks": 10 }));
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let store = MemoryStore::<Value>::new();
        store.fail_next(RemoteError::Transport("down".into()));

        assert!(store.list().await.is_err());
        assert!(store.list().await.is_ok());
        assert_eq!(store.calls(), vec![StoreCall::List, StoreCall::List]);
    }

    #[tokio::test]
    async fn test_missing_rows_are_errors() {
        let store = MemoryStore::<Value>::new();
        assert!(store.update(3, &json!({})).await.is_err());
        assert!(store.delete(3).await.is_err());
    }
}
