//! Maintenance domain services
//!
//! - [`due_date`]: next-due-date arithmetic
//! - [`schedule_store`]: creating, regenerating and deleting an asset's schedules
//! - [`activity_tracker`]: completing occurrences and advancing their schedules

pub mod activity_tracker;
pub mod due_date;
pub mod schedule_store;

pub use activity_tracker::ActivityTracker;
pub use due_date::{next_due_date, next_due_date_from_raw};
pub use schedule_store::ScheduleStore;

use chrono::{Days, NaiveDate};

use crate::config::ReminderConfig;
use crate::models::{MaintenanceSchedule, ReminderPlan, ScheduleAdvance};

/// Reminder for an occurrence on `occurrence`, `lead_days` earlier
pub fn reminder_plan(config: &ReminderConfig, occurrence: NaiveDate) -> ReminderPlan {
    ReminderPlan {
        remind_on: occurrence
            .checked_sub_days(Days::new(u64::from(config.lead_days)))
            .unwrap_or(NaiveDate::MIN),
        notification_type: config.notification_type.clone(),
    }
}

/// Advance a schedule by one period from its current due date
pub fn plan_advance(schedule: &MaintenanceSchedule, config: &ReminderConfig) -> ScheduleAdvance {
    let to = next_due_date(schedule.next_due_date, schedule.kind(), schedule.interval_value);
    ScheduleAdvance {
        schedule_id: schedule.id,
        asset_id: schedule.asset_id,
        from: schedule.next_due_date,
        to,
        reminder: Some(reminder_plan(config, to)),
    }
}
