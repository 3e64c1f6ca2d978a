use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString};
use uuid::Uuid;

use super::reminder::ReminderPlan;

/// Recurrence rule of a maintenance schedule
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Annually,
}

impl ScheduleType {
    /// Lenient parse: trims, ignores case and falls back to `Monthly` for
    /// anything unrecognized, matching how stored free-text values are read.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .to_ascii_lowercase()
            .parse()
            .unwrap_or(ScheduleType::Monthly)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Daily => "daily",
            ScheduleType::Weekly => "weekly",
            ScheduleType::Monthly => "monthly",
            ScheduleType::Quarterly => "quarterly",
            ScheduleType::Annually => "annually",
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted recurring maintenance schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSchedule {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Stored value, lower-cased; may be a type this build does not know
    pub schedule_type: String,
    pub interval_unit: String,
    pub interval_value: u32,
    pub start_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub assigned_user_ids: Vec<Uuid>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceSchedule {
    pub fn kind(&self) -> ScheduleType {
        ScheduleType::parse(&self.schedule_type)
    }
}

/// Caller-supplied schedule input; unset fields fall back to defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub title: String,
    pub description: Option<String>,
    pub schedule_type: Option<String>,
    pub interval_unit: Option<String>,
    pub interval_value: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_user_ids: Vec<Uuid>,
    pub timezone: Option<String>,
}

/// A fully resolved schedule ready to be inserted together with its first
/// pending activity and reminder
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDraft {
    pub asset_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub schedule_type: String,
    pub interval_unit: String,
    pub interval_value: u32,
    pub start_date: NaiveDate,
    pub next_due_date: NaiveDate,
    pub assigned_user_ids: Vec<Uuid>,
    pub timezone: String,
    pub reminder: ReminderPlan,
}

/// Move a schedule from one due date to the next.
///
/// Applied only if the schedule still has `from` as its due date; the
/// repositories report a concurrent update otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleAdvance {
    pub schedule_id: Uuid,
    pub asset_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Reminder for the follow-up activity
    pub reminder: Option<ReminderPlan>,
}
