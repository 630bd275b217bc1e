pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod shell;

pub use domain::{Normalized, PersistenceError, RecordError, ValidationError, ValidationWarning};
pub use infrastructure::config;
pub use infrastructure::seed;
pub use infrastructure::{load_catalog, save_catalog};
pub use services::{Catalog, ServiceError};
