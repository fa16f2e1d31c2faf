//! Error types for Strata Core

use thiserror::Error;

use crate::registry::EntityKind;

/// Boxed error carried by the pass-through variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    // Registry errors
    #[error("{kind} {name} class not found")]
    EntityTypeNotFound { kind: EntityKind, name: String },

    #[error("Invalid {kind} {name}")]
    InvalidEntityClass { kind: EntityKind, name: String },

    // Datastore resolution errors
    #[error("No datastore configuration for {entity}")]
    DatastoreConfigNotFound { entity: String },

    // Pagination errors
    #[error("Page callback cannot consume rekeyed results")]
    InvalidCallback,

    // Failures from below and above the layer, passed through unchanged
    #[error(transparent)]
    Connector(BoxError),

    #[error(transparent)]
    Hook(BoxError),
}

/// Stable numeric codes for programmatic matching across process boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    EntityTypeNotFound = 1,
    InvalidEntityClass = 2,
    DatastoreConfigNotFound = 3,
    InvalidCallback = 4,
    Connector = 10,
    Hook = 11,
}

impl Error {
    /// Wrap a storage connector failure.
    pub fn connector(err: impl Into<BoxError>) -> Self {
        Self::Connector(err.into())
    }

    /// Wrap an application hook failure.
    pub fn hook(err: impl Into<BoxError>) -> Self {
        Self::Hook(err.into())
    }

    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EntityTypeNotFound { .. } => ErrorCode::EntityTypeNotFound,
            Self::InvalidEntityClass { .. } => ErrorCode::InvalidEntityClass,
            Self::DatastoreConfigNotFound { .. } => ErrorCode::DatastoreConfigNotFound,
            Self::InvalidCallback => ErrorCode::InvalidCallback,
            Self::Connector(_) => ErrorCode::Connector,
            Self::Hook(_) => ErrorCode::Hook,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
