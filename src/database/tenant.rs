//! Tenant scoping
//!
//! Every tenant's maintenance tables live in their own PostgreSQL schema. A
//! [`TenantContext`] carries a validated schema name and opens transactions
//! whose `search_path` points at that schema, so repository code issues the
//! same unqualified queries for every tenant.
//!
//! The schema name is passed to `set_config` as a bound parameter and the
//! setting is transaction-local: it disappears on commit or rollback, so a
//! pooled connection never leaks one tenant's scope into the next borrower.
//!
//! SQLite has no schemas. Against SQLite the context is a label only and all
//! tenants share the single namespace, which is what development and the test
//! suite use.

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseTransaction, DbErr, Statement, TransactionTrait,
};
use std::fmt;

use crate::errors::TenantError;

const MAX_SCHEMA_NAME_LEN: usize = 63;

/// A validated tenant schema identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantContext {
    schema: String,
}

impl TenantContext {
    /// Validate a schema name.
    ///
    /// Accepted names are lower-case SQL identifiers (`[a-z_][a-z0-9_]*`, at
    /// most 63 bytes) outside the reserved `pg_` namespace.
    pub fn new(schema: impl Into<String>) -> Result<Self, TenantError> {
        let schema = schema.into();
        validate_schema_name(&schema)?;
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Begin a transaction scoped to this tenant.
    ///
    /// Dropping the returned transaction without committing rolls it back and
    /// returns the connection to the pool.
    pub async fn begin<C>(&self, db: &C) -> Result<DatabaseTransaction, DbErr>
    where
        C: TransactionTrait,
    {
        let txn = db.begin().await?;
        if txn.get_database_backend() == DatabaseBackend::Postgres {
            txn.query_one(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT set_config('search_path', $1, true)",
                [self.schema.clone().into()],
            ))
            .await?;
        }
        Ok(txn)
    }
}

impl fmt::Display for TenantContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.schema)
    }
}

fn validate_schema_name(schema: &str) -> Result<(), TenantError> {
    let invalid = |reason: &str| TenantError::InvalidSchemaName {
        schema: schema.to_string(),
        reason: reason.to_string(),
    };

    let Some(first) = schema.chars().next() else {
        return Err(invalid("name is empty"));
    };
    if schema.len() > MAX_SCHEMA_NAME_LEN {
        return Err(invalid("name is longer than 63 bytes"));
    }
    if !(first.is_ascii_lowercase() || first == '_') {
        return Err(invalid("name must start with a lower-case letter or underscore"));
    }
    if !schema
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(invalid(
            "name may only contain lower-case letters, digits and underscores",
        ));
    }
    if schema.starts_with("pg_") {
        return Err(invalid("the pg_ prefix is reserved"));
    }
    Ok(())
}
