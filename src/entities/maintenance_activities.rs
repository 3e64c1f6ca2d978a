use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of one occurrence. Transitions only move away from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "overdue")]
    Overdue,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_activities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub asset_id: Uuid,
    pub status: ActivityStatus,
    pub scheduled_at: Date,
    pub completed_by: Option<Uuid>,
    pub completed_on: Option<DateTimeUtc>,
    pub duration_minutes: Option<i32>,
    pub work_order_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::maintenance_schedules::Entity",
        from = "Column::ScheduleId",
        to = "super::maintenance_schedules::Column::Id"
    )]
    Schedule,
}

impl Related<super::maintenance_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
