use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The parts of an asset the engine reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetContext {
    pub id: Uuid,
    pub name: String,
    pub product_id: Option<Uuid>,
    pub installation_date: Option<NaiveDate>,
    pub sop_ids: Vec<Uuid>,
    pub incident_plan_ids: Vec<Uuid>,
    pub file_ids: Vec<Uuid>,
    pub location_ids: Vec<Uuid>,
}

/// A product's default maintenance, copied onto assets of that product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceTemplate {
    pub id: Uuid,
    pub product_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub schedule_type: String,
    pub interval_unit: String,
    pub interval_value: i32,
}
