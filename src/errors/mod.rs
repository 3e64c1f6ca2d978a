//! Centralized error handling for the maintenance engine
//!
//! Error types are layered the same way the engine is:
//!
//! - **Repository Errors**: tenant-scoped data access failures
//! - **Tenant Errors**: invalid tenant identifiers
//! - **Mail Errors**: reminder delivery failures, isolated per recipient
//! - **Job Errors**: per-tenant failures inside a job run
//!
//! # Usage
//!
//! ```rust
//! use upkeep::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Ok("success".to_string())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Repository Results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Convenience type alias for Mail Results
pub type MailResult<T> = Result<T, MailError>;

/// Convenience type alias for Job Results
pub type JobResult<T> = Result<T, JobError>;
