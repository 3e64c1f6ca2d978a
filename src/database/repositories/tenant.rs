//! Tenant registries

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::warn;

use super::traits::TenantRegistry;
use crate::database::TenantContext;
use crate::entities::{prelude::*, tenants};
use crate::errors::RepositoryResult;

/// Reads active tenants from the shared `tenants` table
#[derive(Clone)]
pub struct TenantSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl TenantSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait::async_trait]
impl TenantRegistry for TenantSeaOrmRepository {
    async fn active_tenants(&self) -> RepositoryResult<Vec<TenantContext>> {
        let rows = Tenants::find()
            .filter(tenants::Column::IsActive.eq(true))
            .order_by_asc(tenants::Column::Position)
            .order_by_asc(tenants::Column::SchemaName)
            .all(&*self.connection)
            .await?;

        let mut active = Vec::with_capacity(rows.len());
        for row in rows {
            match TenantContext::new(row.schema_name) {
                Ok(tenant) => active.push(tenant),
                Err(e) => warn!("Ignoring tenant '{}': {}", row.display_name, e),
            }
        }
        Ok(active)
    }
}

/// Fixed tenant list taken from configuration
#[derive(Debug, Clone)]
pub struct StaticTenantRegistry {
    tenants: Vec<TenantContext>,
}

impl StaticTenantRegistry {
    pub fn new(tenants: Vec<TenantContext>) -> Self {
        Self { tenants }
    }
}

#[async_trait::async_trait]
impl TenantRegistry for StaticTenantRegistry {
    async fn active_tenants(&self) -> RepositoryResult<Vec<TenantContext>> {
        Ok(self.tenants.clone())
    }
}
