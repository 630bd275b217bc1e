//! Services Layer
//!
//! Catalog operations called by the shell with primitive values. Each service
//! is a set of free functions over a [`Catalog`]; none of them print.

pub mod catalog;
pub mod event_service;
pub mod loan_service;
pub mod notification_service;
pub mod reservation_service;
pub mod resource_service;
pub mod user_service;

pub use catalog::Catalog;

use crate::domain::ValidationError;

/// Error type for service operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} ID '{id}' already exists")]
    DuplicateId { entity: &'static str, id: String },

    #[error("You have already borrowed resource '{0}'")]
    AlreadyBorrowed(String),

    #[error("Resource '{0}' is not available")]
    Unavailable(String),

    #[error("Resource '{0}' is available, borrow it instead of reserving")]
    StillAvailable(String),

    #[error("Not permitted: {0}")]
    NotPermitted(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ServiceError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, id: &str) -> Self {
        ServiceError::DuplicateId {
            entity,
            id: id.to_string(),
        }
    }
}
