//! SeaORM entity definitions
//!
//! Tenant-scoped tables are declared without a schema; the tenant transaction
//! (`TenantContext::begin`) decides which schema they resolve to. `tenants`
//! is the only table read outside a tenant scope.

pub mod prelude;

pub mod assets;
pub mod maintenance_activities;
pub mod maintenance_reminders;
pub mod maintenance_schedules;
pub mod product_maintenance_templates;
pub mod tenants;
pub mod users;
pub mod work_order_assets;
pub mod work_order_assignments;
pub mod work_order_stages;
pub mod work_orders;

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A JSON array of ids stored in a single column
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct IdList(pub Vec<Uuid>);

impl IdList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Uuid>> for IdList {
    fn from(ids: Vec<Uuid>) -> Self {
        Self(ids)
    }
}

impl From<IdList> for Vec<Uuid> {
    fn from(list: IdList) -> Self {
        list.0
    }
}
