use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::IdList;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_order_assets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub work_order_id: Uuid,
    pub asset_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub sop_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub incident_plan_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub file_ids: IdList,
    #[sea_orm(column_type = "JsonBinary")]
    pub location_ids: IdList,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_orders::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_orders::Column::Id"
    )]
    WorkOrder,
}

impl Related<super::work_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
