//! Grid errors and their display text

use crate::columns::{label_for, ColumnDef};
use crate::row::RowId;
use furrow_common::RemoteError;
use furrow_draft::{DraftError, FieldErrors};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),

    #[error("Row {0} not found")]
    UnknownRow(RowId),

    #[error("Row {0} is not being edited")]
    NotEditing(RowId),
}

/// Flatten a remote failure into the single error slot.
///
/// Structured rejections become one `"Label: message"` line per field;
/// anything else becomes `fallback`.
pub fn describe_remote_error(error: &RemoteError, columns: &[ColumnDef], fallback: &str) -> String {
    match error {
        RemoteError::Rejected(fields) if !fields.is_empty() => fields
            .iter()
            .map(|rejection| {
                format!(
                    "{}: {}",
                    label_for(columns, &rejection.field),
                    rejection.messages.join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => fallback.to_string(),
    }
}

/// Same flattening for local validation errors
pub fn describe_validation_errors(errors: &FieldErrors, columns: &[ColumnDef]) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", label_for(columns, field), message))
        .collect::<Vec<_>>()
        .join("\n")
}
