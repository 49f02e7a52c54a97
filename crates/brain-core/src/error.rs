use serde::Serialize;
use thiserror::Error;

/// Top-level error type for Enterprise Brain operations.
///
/// Every variant maps to one [`ErrorKind`]; the kind is what callers branch
/// on and what the response envelope reports.
#[derive(Error, Debug)]
pub enum BrainError {
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("Edge endpoint not found: {missing} (edge {source_id} -> {target_id})")]
    EndpointNotFound {
        source_id: String,
        target_id: String,
        missing: String,
    },

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// A malformed argument that is not an identifier, e.g. metadata that is
    /// not a JSON object.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Node {id} already exists with type {stored}; refusing to re-type it as {requested}")]
    TypeMismatch {
        id: String,
        stored: String,
        requested: String,
    },

    #[error("Graph store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Graph store operation failed: {0}")]
    StoreOperationFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Machine-readable error category.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidIdentifier,
    EndpointNotFound,
    NodeNotFound,
    EmptyInput,
    InvalidInput,
    TypeMismatch,
    StoreUnavailable,
    StoreOperationFailed,
    Config,
}

impl BrainError {
    pub fn invalid_identifier(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Self::EndpointNotFound { .. } => ErrorKind::EndpointNotFound,
            Self::NodeNotFound(_) => ErrorKind::NodeNotFound,
            Self::EmptyInput(_) => ErrorKind::EmptyInput,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::StoreOperationFailed(_) => ErrorKind::StoreOperationFailed,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Caller mistakes, as opposed to infrastructure faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidIdentifier
                | ErrorKind::EndpointNotFound
                | ErrorKind::NodeNotFound
                | ErrorKind::EmptyInput
                | ErrorKind::InvalidInput
                | ErrorKind::TypeMismatch
        )
    }

    /// Only an unreachable or timed-out store is worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::StoreUnavailable
    }
}

pub type Result<T> = std::result::Result<T, BrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_and_server_classification() {
        assert!(BrainError::NodeNotFound("x".into()).is_client_error());
        assert!(BrainError::EmptyInput("blank".into()).is_client_error());
        assert!(BrainError::InvalidInput("not json".into()).is_client_error());
        assert!(!BrainError::StoreUnavailable("down".into()).is_client_error());
        assert!(!BrainError::StoreOperationFailed("boom".into()).is_client_error());
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(BrainError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!BrainError::StoreOperationFailed("syntax".into()).is_retryable());
        assert!(!BrainError::invalid_identifier("a b", "space").is_retryable());
    }

    #[test]
    fn kind_serializes_as_name() {
        let json = serde_json::to_string(&ErrorKind::EndpointNotFound).unwrap();
        assert_eq!(json, "\"EndpointNotFound\"");
    }
}
