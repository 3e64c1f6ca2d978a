use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::entities::maintenance_activities::ActivityStatus;

/// One occurrence of a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceActivity {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub asset_id: Uuid,
    pub status: ActivityStatus,
    pub scheduled_at: NaiveDate,
    pub completed_by: Option<Uuid>,
    pub completed_on: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    pub work_order_id: Option<Uuid>,
}

impl MaintenanceActivity {
    /// Whether this is the schedule's upcoming occurrence, i.e. not yet
    /// handed to a work order.
    pub fn is_upcoming(&self) -> bool {
        self.work_order_id.is_none() && self.status != ActivityStatus::Completed
    }
}

/// Input for marking an occurrence as done
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCompletion {
    pub activity_id: Uuid,
    pub completed_by: Option<Uuid>,
    pub completed_on: DateTime<Utc>,
    pub duration_minutes: Option<u32>,
}

/// Overdue sweep candidate
#[derive(Debug, Clone, PartialEq)]
pub struct PendingActivity {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub scheduled_at: NaiveDate,
    /// IANA zone of the owning schedule
    pub timezone: String,
}

/// Rows soft-deleted by a cascade
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeCounts {
    pub schedules: u64,
    pub activities: u64,
    pub reminders: u64,
}
