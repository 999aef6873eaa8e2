use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One field the server refused, with every message it gave for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRejection {
    pub field: String,
    pub messages: Vec<String>,
}

impl FieldRejection {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            messages: vec![message.into()],
        }
    }
}

/// Failure reported by a persister or a row store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    /// Structured rejection naming the offending fields
    #[error("Server rejected {} field(s)", .0.len())]
    Rejected(Vec<FieldRejection>),

    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered a create/update without an identifier
    #[error("{operation} response carried no identifier")]
    MissingIdentifier { operation: &'static str },

    #[error("Generic error: {0}")]
    Generic(String),
}

impl RemoteError {
    /// Build a rejection for a single field
    pub fn rejected(field: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteError::Rejected(vec![FieldRejection::new(field, message)])
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, RemoteError::MissingIdentifier { .. })
    }
}

impl From<String> for RemoteError {
    fn from(s: String) -> Self {
        RemoteError::Generic(s)
    }
}

impl From<&str> for RemoteError {
    fn from(s: &str) -> Self {
        RemoteError::Generic(s.to_string())
    }
}
