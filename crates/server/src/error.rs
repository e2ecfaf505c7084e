//! Error taxonomy of the recommendation service.

use graph_store::StoreError;
use thiserror::Error;

/// Errors returned by [`GenreRecommender`](crate::GenreRecommender) operations.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or malformed input; nothing was attempted against the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The user already exists; nothing was written
    #[error("User already exists: {0}")]
    Conflict(String),

    /// The target user does not exist; nothing was written
    #[error("User not found: {0}")]
    NotFound(String),

    /// No store is connected
    #[error("No active connection to the graph store")]
    StoreUnavailable,

    /// The store failed, dropped the connection or timed out
    #[error("Graph store error: {0}")]
    Store(#[source] StoreError),

    /// Membership changed but the SIMILAR rebuild afterwards failed, so
    /// similarity weights may be stale until the next successful rebuild
    #[error("{operation} for '{user}' was applied but similarity weights may be stale: {source}")]
    SimilarityStale {
        operation: &'static str,
        user: String,
        #[source]
        source: StoreError,
    },

    /// A membership change timed out. It may still commit after the call
    /// returns; if it does, its SIMILAR rebuild runs in the same unit
    #[error("{operation} for '{user}' did not finish in time and may still be applied: {source}")]
    Unconfirmed {
        operation: &'static str,
        user: String,
        #[source]
        source: StoreError,
    },

    /// Anything else (worker panics, filter failures)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Coarse classification a caller (an HTTP layer, a CLI) can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    StoreUnavailable,
    StoreError,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput(_) => ErrorKind::InvalidInput,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::StoreUnavailable => ErrorKind::StoreUnavailable,
            ServiceError::Store(_)
            | ServiceError::SimilarityStale { .. }
            | ServiceError::Unconfirmed { .. }
            | ServiceError::Internal(_) => ErrorKind::StoreError,
        }
    }

    /// Whether the same call may succeed if the caller tries again.
    ///
    /// The service itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::StoreUnavailable => true,
            ServiceError::Store(err)
            | ServiceError::SimilarityStale { source: err, .. }
            | ServiceError::Unconfirmed { source: err, .. } => err.is_transient(),
            _ => false,
        }
    }

    /// True when a membership change went through, or may still go
    /// through, even though the call failed.
    pub fn membership_applied(&self) -> bool {
        matches!(
            self,
            ServiceError::SimilarityStale { .. } | ServiceError::Unconfirmed { .. }
        )
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserExists { name } => ServiceError::Conflict(name),
            StoreError::UserNotFound { name } => ServiceError::NotFound(name),
            StoreError::InvalidValue { field, value } => {
                ServiceError::InvalidInput(format!("invalid {field}: '{value}'"))
            }
            other => ServiceError::Store(other),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_store_errors_map_onto_taxonomy() {
        let conflict: ServiceError = StoreError::UserExists { name: "ana".into() }.into();
        assert_eq!(conflict.kind(), ErrorKind::Conflict);

        let missing: ServiceError = StoreError::UserNotFound { name: "ana".into() }.into();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let closed: ServiceError = StoreError::Closed.into();
        assert_eq!(closed.kind(), ErrorKind::StoreError);
        assert!(!closed.is_retryable());
    }

    #[test]
    fn test_timeouts_are_retryable() {
        let timeout: ServiceError = StoreError::Timeout {
            operation: "list_users",
            after: Duration::from_millis(10),
        }
        .into();
        assert!(timeout.is_retryable());
        assert!(ServiceError::StoreUnavailable.is_retryable());
        assert!(!ServiceError::NotFound("ana".into()).is_retryable());
    }

    #[test]
    fn test_stale_similarity_reports_applied_membership() {
        let err = ServiceError::SimilarityStale {
            operation: "add_user",
            user: "ana".into(),
            source: StoreError::Closed,
        };
        assert!(err.membership_applied());
        assert_eq!(err.kind(), ErrorKind::StoreError);
        assert!(err.to_string().contains("may be stale"));
    }

    #[test]
    fn test_unconfirmed_membership_is_retryable_store_error() {
        let err = ServiceError::Unconfirmed {
            operation: "add_user",
            user: "ana".into(),
            source: StoreError::Timeout {
                operation: "add_user",
                after: Duration::from_millis(10),
            },
        };
        assert!(err.membership_applied());
        assert!(err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::StoreError);
    }
}
