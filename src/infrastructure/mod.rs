//! Infrastructure layer
//!
//! This layer contains:
//! - Configuration loading (config)
//! - The JSON catalog file (persistence)
//! - Default admin and demo data (seed)

pub mod config;
pub mod persistence;
pub mod seed;

pub use persistence::{load_catalog, save_catalog};
