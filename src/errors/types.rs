//! Error type definitions for the maintenance engine
//!
//! Each layer owns its error enum; higher layers wrap lower ones with
//! `#[from]` so `?` carries the chain up to the job runner, which decides
//! whether a failure skips an occurrence, a tenant, or the whole run.

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Mail delivery errors
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Record not found
    #[error("Record not found: {table} with {field} = {value}")]
    RecordNotFound {
        table: String,
        field: String,
        value: String,
    },

    /// Constraint violations (unique, foreign key, etc.)
    #[error("Constraint violation: {constraint} - {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// A guarded update matched no row because another writer got there first
    #[error("Concurrent update on {table} {id}: {message}")]
    ConcurrentUpdate {
        table: String,
        id: Uuid,
        message: String,
    },

    /// Invalid input rejected before touching the database
    #[error("Validation failed: {message}")]
    Validation { message: String },
}

/// Tenant identifier errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    /// Schema names must be plain lower-case SQL identifiers
    #[error("Invalid tenant schema name '{schema}': {reason}")]
    InvalidSchemaName { schema: String, reason: String },
}

/// Mail delivery errors
#[derive(Error, Debug)]
pub enum MailError {
    /// Recipient address is unusable
    #[error("Invalid recipient: {recipient}")]
    InvalidRecipient { recipient: String },

    /// Transport failure talking to the mail service
    #[error("Mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The mail service answered but refused the message
    #[error("Mail rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Errors that end a single tenant's part of a job run
#[derive(Error, Debug)]
pub enum JobError {
    /// Tenant has no default work-order stage configured
    #[error("No default work order stage configured for tenant '{tenant}'")]
    MissingDefaultStage { tenant: String },

    /// Repository failure while processing a tenant
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Tenant did not finish inside its time budget
    #[error("Tenant '{tenant}' exceeded its time budget of {budget:?}")]
    Timeout { tenant: String, budget: Duration },

    /// Tenant registry could not be listed; aborts the whole run
    #[error("Tenant registry unavailable: {0}")]
    Registry(#[source] RepositoryError),
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl RepositoryError {
    /// Create a record-not-found error
    pub fn not_found<T: Into<String>, F: Into<String>, V: ToString>(
        table: T,
        field: F,
        value: V,
    ) -> Self {
        Self::RecordNotFound {
            table: table.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether retrying on the next run can reasonably succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Database(sea_orm::DbErr::ConnectionAcquire(_))
                | Self::Database(sea_orm::DbErr::Conn(_))
                | Self::ConcurrentUpdate { .. }
        )
    }
}

impl JobError {
    /// Whether the error only means "nothing to do for this tenant"
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::MissingDefaultStage { .. })
    }
}
