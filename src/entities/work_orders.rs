use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub stage_id: Uuid,
    pub severity: String,
    pub category: String,
    pub source: String,
    pub maintenance_schedule_id: Option<Uuid>,
    /// The schedule's due date this work order was generated for
    pub occurrence_date: Option<Date>,
    pub due_date: Option<Date>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::work_order_assets::Entity")]
    Assets,
    #[sea_orm(has_many = "super::work_order_assignments::Entity")]
    Assignments,
}

impl Related<super::work_order_assets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::work_order_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
