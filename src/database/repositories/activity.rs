//! SeaORM activity repository

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use super::traits::ActivityRepository;
use super::{apply_guarded_advance, insert_upcoming_activity};
use crate::database::TenantContext;
use crate::entities::{maintenance_activities, maintenance_schedules, prelude::*};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{
    ActivityCompletion, ActivityStatus, MaintenanceActivity, PendingActivity, ScheduleAdvance,
};

/// SeaORM-based activity repository
#[derive(Clone)]
pub struct ActivitySeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ActivitySeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for ActivitySeaOrmRepository {
    async fn find_activity(
        &self,
        tenant: &TenantContext,
        activity_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceActivity>> {
        let txn = tenant.begin(&*self.connection).await?;
        let model = MaintenanceActivities::find_by_id(activity_id)
            .filter(maintenance_activities::Column::DeletedAt.is_null())
            .one(&txn)
            .await?;
        txn.commit().await?;
        Ok(model.map(activity_to_domain))
    }

    async fn find_for_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceActivity>> {
        let txn = tenant.begin(&*self.connection).await?;
        let models = MaintenanceActivities::find()
            .filter(maintenance_activities::Column::ScheduleId.eq(schedule_id))
            .filter(maintenance_activities::Column::DeletedAt.is_null())
            .order_by_asc(maintenance_activities::Column::ScheduledAt)
            .order_by_asc(maintenance_activities::Column::CreatedAt)
            .all(&txn)
            .await?;
        txn.commit().await?;
        Ok(models.into_iter().map(activity_to_domain).collect())
    }

    async fn complete_activity(
        &self,
        tenant: &TenantContext,
        completion: ActivityCompletion,
        advance: Option<ScheduleAdvance>,
    ) -> RepositoryResult<MaintenanceActivity> {
        let txn = tenant.begin(&*self.connection).await?;

        let model = MaintenanceActivities::find_by_id(completion.activity_id)
            .filter(maintenance_activities::Column::DeletedAt.is_null())
            .one(&txn)
            .await?
            .ok_or_else(|| {
                RepositoryError::not_found(
                    "maintenance_activities",
                    "id",
                    completion.activity_id,
                )
            })?;

        if model.status == ActivityStatus::Completed {
            return Err(RepositoryError::validation(format!(
                "activity {} is already completed",
                model.id
            )));
        }

        let mut active: maintenance_activities::ActiveModel = model.into();
        active.status = Set(ActivityStatus::Completed);
        active.completed_by = Set(completion.completed_by);
        active.completed_on = Set(Some(completion.completed_on));
        active.duration_minutes = Set(completion
            .duration_minutes
            .map(|minutes| i32::try_from(minutes).unwrap_or(i32::MAX)));
        active.updated_at = Set(completion.completed_on);
        let updated = active.update(&txn).await?;

        if let Some(advance) = advance {
            apply_guarded_advance(&txn, &advance, completion.completed_on).await?;
            insert_upcoming_activity(
                &txn,
                advance.schedule_id,
                advance.asset_id,
                advance.to,
                advance.reminder.as_ref(),
                completion.completed_on,
            )
            .await?;
        }

        txn.commit().await?;
        Ok(activity_to_domain(updated))
    }

    async fn find_pending_before(
        &self,
        tenant: &TenantContext,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PendingActivity>> {
        let txn = tenant.begin(&*self.connection).await?;
        let rows = MaintenanceActivities::find()
            .find_also_related(MaintenanceSchedules)
            .filter(maintenance_activities::Column::Status.eq(ActivityStatus::Pending))
            .filter(maintenance_activities::Column::ScheduledAt.lt(cutoff))
            .filter(maintenance_activities::Column::DeletedAt.is_null())
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .order_by_asc(maintenance_activities::Column::ScheduledAt)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(rows
            .into_iter()
            .filter_map(|(activity, schedule)| {
                schedule.map(|schedule| PendingActivity {
                    id: activity.id,
                    schedule_id: activity.schedule_id,
                    scheduled_at: activity.scheduled_at,
                    timezone: schedule.timezone,
                })
            })
            .collect())
    }

    async fn mark_overdue(
        &self,
        tenant: &TenantContext,
        activity_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> RepositoryResult<u64> {
        if activity_ids.is_empty() {
            return Ok(0);
        }

        let txn = tenant.begin(&*self.connection).await?;
        let result = MaintenanceActivities::update_many()
            .col_expr(
                maintenance_activities::Column::Status,
                Expr::value(ActivityStatus::Overdue),
            )
            .col_expr(maintenance_activities::Column::UpdatedAt, Expr::value(now))
            .filter(maintenance_activities::Column::Id.is_in(activity_ids.iter().copied()))
            .filter(maintenance_activities::Column::Status.eq(ActivityStatus::Pending))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(result.rows_affected)
    }
}

pub(crate) fn activity_to_domain(model: maintenance_activities::Model) -> MaintenanceActivity {
    MaintenanceActivity {
        id: model.id,
        schedule_id: model.schedule_id,
        asset_id: model.asset_id,
        status: model.status,
        scheduled_at: model.scheduled_at,
        completed_by: model.completed_by,
        completed_on: model.completed_on,
        duration_minutes: model
            .duration_minutes
            .and_then(|minutes| u32::try_from(minutes).ok()),
        work_order_id: model.work_order_id,
    }
}
