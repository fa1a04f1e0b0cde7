use thiserror::Error;

use serp_common::{ConnectionError, StoreError};

/// Classified activity failure, returned to the orchestrator as-is.
#[derive(Error, Debug)]
pub enum ActivityError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("failed to create table: {0}")]
    Schema(#[source] StoreError),

    #[error("failed to send batch: {0}")]
    Ingestion(#[source] StoreError),

    #[error(transparent)]
    Query(StoreError),

    #[error("activity cancelled")]
    Cancelled,

    #[error("activity deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ActivityError {
    /// Whether re-running the whole activity may succeed. Input errors never will.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ActivityError::InvalidInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serp_common::StoreKind;

    #[test]
    fn only_invalid_input_is_terminal() {
        assert!(ActivityError::Connection(ConnectionError::new(StoreKind::Graph, "refused"))
            .is_retryable());
        assert!(ActivityError::Schema(StoreError::new("x")).is_retryable());
        assert!(ActivityError::Ingestion(StoreError::new("x")).is_retryable());
        assert!(ActivityError::Query(StoreError::new("x")).is_retryable());
        assert!(ActivityError::Cancelled.is_retryable());
        assert!(ActivityError::DeadlineExceeded.is_retryable());
        assert!(!ActivityError::InvalidInput("empty keyword".into()).is_retryable());
    }

    #[test]
    fn messages_wrap_the_cause() {
        let err = ActivityError::Ingestion(StoreError::new("connection reset"));
        assert_eq!(err.to_string(), "failed to send batch: connection reset");

        let err = ActivityError::Query(StoreError::new("Invalid input 'MATC'"));
        assert_eq!(err.to_string(), "Invalid input 'MATC'");

        let err = ActivityError::from(ConnectionError::new(StoreKind::Analytics, "refused"));
        assert_eq!(err.to_string(), "failed to connect to analytics store: refused");
    }
}
