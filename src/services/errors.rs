use lambda_runtime::Diagnostic;
use thiserror::Error;

use crate::infrastructure::store::StoreError;

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("note not found: {0}")]
    NotFound(String),
    #[error("unsupported operation: {type_name}.{field_name}")]
    UnsupportedOperation {
        type_name: String,
        field_name: String,
    },
    #[error("note store unavailable: {0}")]
    TransientStore(String),
    #[error("integrity error: {0}")]
    Integrity(String),
}

impl ResolverError {
    /// Tag reported to AppSync as `errorType`.
    pub fn error_type(&self) -> &'static str {
        match self {
            ResolverError::Validation(_) => "ValidationError",
            ResolverError::NotFound(_) => "NotFoundError",
            ResolverError::UnsupportedOperation { .. } => "UnsupportedOperationError",
            ResolverError::TransientStore(_) => "TransientStoreError",
            ResolverError::Integrity(_) => "IntegrityError",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolverError::TransientStore(_))
    }

    /// Expected outcomes of a well-formed call, as opposed to incidents.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            ResolverError::Validation(_) | ResolverError::NotFound(_)
        )
    }
}

impl From<StoreError> for ResolverError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ResolverError::NotFound(id),
            StoreError::AlreadyExists(id) => {
                ResolverError::Validation(format!("note {id} already exists"))
            }
            StoreError::Rejected(message) => ResolverError::Validation(message),
            StoreError::Misconfigured(message) => {
                ResolverError::Integrity(format!("note store misconfigured: {message}"))
            }
            StoreError::Transient(message) => ResolverError::TransientStore(message),
            StoreError::Integrity(message) => ResolverError::Integrity(message),
        }
    }
}

impl From<ResolverError> for Diagnostic {
    fn from(err: ResolverError) -> Self {
        Diagnostic {
            error_type: err.error_type().to_string(),
            error_message: err.to_string(),
        }
    }
}
