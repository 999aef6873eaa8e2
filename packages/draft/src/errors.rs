//! Error types for the draft machine

use furrow_common::PathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DraftError {
    #[error("Invalid field path: {0}")]
    Path(#[from] PathError),

    /// The edit produced a document that no longer fits the entity type
    #[error("Edit does not fit the entity shape: {0}")]
    Shape(#[from] serde_json::Error),

    /// The entity type has no field at this path
    #[error("Unknown field: {0}")]
    UnknownField(String),
}
