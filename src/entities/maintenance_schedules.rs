use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::IdList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_schedules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Lower-cased; unknown values are kept and treated as monthly
    pub schedule_type: String,
    pub interval_unit: String,
    pub interval_value: i32,
    pub start_date: Date,
    pub next_due_date: Date,
    #[sea_orm(column_type = "JsonBinary")]
    pub assigned_user_ids: IdList,
    pub timezone: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assets::Entity",
        from = "Column::AssetId",
        to = "super::assets::Column::Id"
    )]
    Asset,
    #[sea_orm(has_many = "super::maintenance_activities::Entity")]
    Activities,
    #[sea_orm(has_many = "super::maintenance_reminders::Entity")]
    Reminders,
}

impl Related<super::assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl Related<super::maintenance_activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::maintenance_reminders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
