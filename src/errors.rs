use thiserror::Error;
use uuid::Uuid;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the remote expense store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rejected by store: {0}")]
    Rejected(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Expense not found: {0}")]
    NotFound(Uuid),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Error type returned by ledger cache operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid input: {0}")]
    Validation(String),
    /// A load result arrived after a newer load was issued. Never shown to users.
    #[error("Stale load result discarded")]
    StaleRequestDiscarded,
}

impl LedgerError {
    /// Whether this error should reach the notification collaborator.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, LedgerError::StaleRequestDiscarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_pass_through_transparently() {
        let err = LedgerError::from(StoreError::Network("connection reset".into()));
        assert_eq!(err.to_string(), "Network error: connection reset");
        assert!(err.is_user_visible());
    }

    #[test]
    fn stale_results_are_not_user_visible() {
        assert!(!LedgerError::StaleRequestDiscarded.is_user_visible());
    }
}
