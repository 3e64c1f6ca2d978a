use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::IdList;

/// Asset records are owned by the asset CRUD surface; the engine only reads them.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub product_id: Option<Uuid>,
    pub installation_date: Option<Date>,
    #[sea_orm(column_type = "JsonBinary")]
    pub sop_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub incident_plan_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub file_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub location_ids: IdList,
    pub created_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::maintenance_schedules::Entity")]
    MaintenanceSchedules,
}

impl Related<super::maintenance_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MaintenanceSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
