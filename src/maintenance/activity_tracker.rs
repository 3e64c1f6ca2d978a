//! Occurrence completion
//!
//! Completing the schedule's upcoming occurrence (the one not yet handed to
//! a work order) advances the schedule and opens the next occurrence.
//! Completing an occurrence that already has a work order only records the
//! completion: the schedule moved on when the work order was generated.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::plan_advance;
use crate::config::ReminderConfig;
use crate::database::TenantContext;
use crate::database::repositories::{ActivityRepository, ScheduleRepository};
use crate::errors::{AppError, AppResult, RepositoryError};
use crate::models::{ActivityCompletion, ActivityStatus, MaintenanceActivity};

#[derive(Clone)]
pub struct ActivityTracker {
    schedules: Arc<dyn ScheduleRepository>,
    activities: Arc<dyn ActivityRepository>,
    reminders: ReminderConfig,
}

impl ActivityTracker {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        activities: Arc<dyn ActivityRepository>,
        reminders: ReminderConfig,
    ) -> Self {
        Self {
            schedules,
            activities,
            reminders,
        }
    }

    pub async fn get(
        &self,
        tenant: &TenantContext,
        activity_id: Uuid,
    ) -> AppResult<MaintenanceActivity> {
        self.activities
            .find_activity(tenant, activity_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found("maintenance_activities", "id", activity_id).into()
            })
    }

    /// Occurrences of a schedule, oldest first
    pub async fn history(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> AppResult<Vec<MaintenanceActivity>> {
        Ok(self.activities.find_for_schedule(tenant, schedule_id).await?)
    }

    /// Mark an occurrence completed.
    ///
    /// Both pending and overdue occurrences can be completed; completing an
    /// already completed one is a validation error.
    pub async fn complete(
        &self,
        tenant: &TenantContext,
        completion: ActivityCompletion,
    ) -> AppResult<MaintenanceActivity> {
        let activity = self.get(tenant, completion.activity_id).await?;
        if activity.status == ActivityStatus::Completed {
            return Err(AppError::validation(format!(
                "activity {} is already completed",
                activity.id
            )));
        }

        let advance = if activity.is_upcoming() {
            let schedule = self
                .schedules
                .find_schedule(tenant, activity.schedule_id)
                .await?;
            schedule
                .filter(|schedule| schedule.next_due_date == activity.scheduled_at)
                .map(|schedule| plan_advance(&schedule, &self.reminders))
        } else {
            None
        };

        if let Some(advance) = &advance {
            info!(
                "Completing activity {} advances schedule {} from {} to {}",
                activity.id, advance.schedule_id, advance.from, advance.to
            );
        }

        let completed = self
            .activities
            .complete_activity(tenant, completion, advance)
            .await?;
        Ok(completed)
    }
}
