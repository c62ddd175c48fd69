use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend is unreachable or rejected the request.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The adapter does not support this operation. Surfaced explicitly so a
    /// caller can never mistake a missing capability for success.
    #[error("storage operation `{operation}` is not implemented by this backend")]
    NotImplemented {
        /// Name of the unsupported trait operation.
        operation: &'static str,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a not-implemented error for the named operation.
    pub fn not_implemented(operation: &'static str) -> Self {
        StorageError::NotImplemented { operation }
    }
}
