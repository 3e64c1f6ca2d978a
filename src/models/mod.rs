//! Domain models for the maintenance engine
//!
//! These are the shapes the jobs and services work with. They are decoupled
//! from the SeaORM entities so the job logic can run against any
//! implementation of the repository traits.

pub mod activity;
pub mod asset;
pub mod reminder;
pub mod schedule;
pub mod work_order;

pub use activity::{
    ActivityCompletion, ActivityStatus, CascadeCounts, MaintenanceActivity, PendingActivity,
};
pub use asset::{AssetContext, MaintenanceTemplate};
pub use reminder::{Reminder, ReminderDispatch, ReminderPlan};
pub use schedule::{MaintenanceSchedule, NewSchedule, ScheduleAdvance, ScheduleDraft, ScheduleType};
pub use work_order::{OccurrencePlan, WORK_ORDER_SOURCE};
