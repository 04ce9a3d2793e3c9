//! Shared utilities, configuration, and error handling for Voyage
//!
//! This crate provides common functionality used across the Voyage service:
//! - Configuration management following 12-factor principles
//! - Error types and their HTTP mapping
//! - Database pool construction and repository errors
//! - Request extractors (validated JSON, pagination)

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use db::RepositoryError;
pub use error::{Error, ErrorClass, FieldError, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
