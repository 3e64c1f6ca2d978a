use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub activity_id: Uuid,
    pub notification_type: String,
    pub remind_on: NaiveDate,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
}

/// Reminder to create alongside a new pending activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlan {
    pub remind_on: NaiveDate,
    pub notification_type: String,
}

/// One (reminder, assigned user) pair ready to be mailed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderDispatch {
    pub reminder_id: Uuid,
    pub schedule_id: Uuid,
    pub activity_id: Uuid,
    pub schedule_title: String,
    pub asset_id: Uuid,
    pub asset_name: Option<String>,
    pub scheduled_at: NaiveDate,
    pub user_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl ReminderDispatch {
    /// The recipient address, if it looks deliverable
    pub fn usable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty() && email.contains('@'))
    }
}
