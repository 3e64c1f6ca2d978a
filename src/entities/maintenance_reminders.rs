use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_reminders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub activity_id: Uuid,
    pub notification_type: String,
    /// Occurrence date minus the lead time
    pub remind_on: Date,
    pub notified: bool,
    pub notified_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
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
    #[sea_orm(
        belongs_to = "super::maintenance_activities::Entity",
        from = "Column::ActivityId",
        to = "super::maintenance_activities::Column::Id"
    )]
    Activity,
}

impl Related<super::maintenance_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl Related<super::maintenance_activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activity.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
