use chrono::NaiveDate;
use uuid::Uuid;

use super::asset::AssetContext;
use super::schedule::ScheduleAdvance;

/// `work_orders.source` for generated work orders
pub const WORK_ORDER_SOURCE: &str = "maintenance";

/// Everything needed to turn one due occurrence into a work order.
///
/// The repository applies a plan atomically: work order, asset linkage,
/// assignment, activity hand-off and the schedule advance commit together
/// or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct OccurrencePlan {
    pub schedule_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub stage_id: Uuid,
    pub severity: String,
    pub category: String,
    pub asset: AssetContext,
    pub assigned_user_ids: Vec<Uuid>,
    pub advance: ScheduleAdvance,
}
