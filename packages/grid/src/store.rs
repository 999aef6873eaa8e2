//! Per-entity REST collaborator contract

use crate::row::RowId;
use async_trait::async_trait;
use furrow_common::RemoteResult;
use serde::{Deserialize, Serialize};

/// List response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub results: Vec<T>,
}

/// Remote collection of one entity type.
///
/// `create` and `update` must answer with the canonical entity, carrying its
/// identifier; the grid treats a missing identifier as a protocol violation.
#[async_trait]
pub trait RowStore<T>: Send + Sync {
    async fn list(&self) -> RemoteResult<Listing<T>>;

    async fn create(&self, data: &T) -> RemoteResult<T>;

    async fn update(&self, id: RowId, data: &T) -> RemoteResult<T>;

    async fn delete(&self, id: RowId) -> RemoteResult<()>;
}
