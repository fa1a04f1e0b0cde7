use thiserror::Error;

use crate::types::StoreKind;

/// Boxed driver error carried through the store traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure reported by a store backend (sqlx, neo4rs, or a test double).
#[derive(Error, Debug)]
#[error(transparent)]
pub struct StoreError(BoxError);

impl StoreError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    /// The underlying driver error.
    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

/// Failure to establish or reuse a store handle.
///
/// Cloneable so the outcome of the single initialization attempt can be
/// handed to every caller that observes it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to connect to {store}: {message}")]
pub struct ConnectionError {
    pub store: StoreKind,
    pub message: String,
}

impl ConnectionError {
    pub fn new(store: StoreKind, cause: impl std::fmt::Display) -> Self {
        Self {
            store,
            message: cause.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}
