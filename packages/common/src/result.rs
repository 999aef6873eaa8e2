use crate::error::RemoteError;

/// Result of a call against the remote store
pub type RemoteResult<T> = Result<T, RemoteError>;
