//! Domain layer - Pure business abstractions
//!
//! This layer contains NO I/O. Only validation rules and the error types
//! shared by the entity, service and persistence layers.

pub mod errors;
pub mod validation;

pub use errors::{PersistenceError, RecordError, ValidationError};
pub use validation::{Normalized, ValidationWarning};
