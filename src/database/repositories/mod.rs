//! SeaORM repository implementations
//!
//! Each repository holds the shared connection pool and opens a
//! tenant-scoped transaction per operation through
//! [`TenantContext::begin`](crate::database::TenantContext::begin). The
//! helpers in this module are the write paths shared by more than one
//! repository; they always run on a caller-owned transaction.

pub mod activity;
pub mod reminder;
pub mod schedule;
pub mod tenant;
pub mod traits;
pub mod work_order;

pub use activity::ActivitySeaOrmRepository;
pub use reminder::ReminderSeaOrmRepository;
pub use schedule::ScheduleSeaOrmRepository;
pub use tenant::{StaticTenantRegistry, TenantSeaOrmRepository};
pub use traits::{
    ActivityRepository, ReminderRepository, ScheduleRepository, TenantRegistry,
    WorkOrderRepository,
};
pub use work_order::WorkOrderSeaOrmRepository;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use crate::entities::{maintenance_activities, maintenance_reminders, maintenance_schedules};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{ActivityStatus, CascadeCounts, ReminderPlan, ScheduleAdvance};

/// Insert a pending activity for `scheduled_at` and, if planned, its reminder.
pub(crate) async fn insert_upcoming_activity(
    txn: &DatabaseTransaction,
    schedule_id: Uuid,
    asset_id: Uuid,
    scheduled_at: NaiveDate,
    reminder: Option<&ReminderPlan>,
    now: DateTime<Utc>,
) -> Result<Uuid, DbErr> {
    let activity_id = Uuid::new_v4();

    maintenance_activities::ActiveModel {
        id: Set(activity_id),
        schedule_id: Set(schedule_id),
        asset_id: Set(asset_id),
        status: Set(ActivityStatus::Pending),
        scheduled_at: Set(scheduled_at),
        completed_by: Set(None),
        completed_on: Set(None),
        duration_minutes: Set(None),
        work_order_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;

    if let Some(plan) = reminder {
        maintenance_reminders::ActiveModel {
            id: Set(Uuid::new_v4()),
            schedule_id: Set(schedule_id),
            activity_id: Set(activity_id),
            notification_type: Set(plan.notification_type.clone()),
            remind_on: Set(plan.remind_on),
            notified: Set(false),
            notified_at: Set(None),
            created_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(txn)
        .await?;
    }

    Ok(activity_id)
}

/// Carry the schedule's upcoming activity from `advance.from` to `advance.to`.
///
/// The activity keeps its id and returns to `pending`; its un-notified
/// reminders move to the new remind date, or a fresh reminder is planned when
/// the old one was already sent. A schedule without an upcoming activity gets
/// a new one, so exactly one pending occurrence sits on `next_due_date`.
pub(crate) async fn roll_upcoming_activity(
    txn: &DatabaseTransaction,
    advance: &ScheduleAdvance,
    now: DateTime<Utc>,
) -> Result<Uuid, DbErr> {
    let upcoming = maintenance_activities::Entity::find()
        .filter(maintenance_activities::Column::ScheduleId.eq(advance.schedule_id))
        .filter(maintenance_activities::Column::ScheduledAt.eq(advance.from))
        .filter(maintenance_activities::Column::Status.ne(ActivityStatus::Completed))
        .filter(maintenance_activities::Column::WorkOrderId.is_null())
        .filter(maintenance_activities::Column::DeletedAt.is_null())
        .one(txn)
        .await?;

    let Some(activity) = upcoming else {
        return insert_upcoming_activity(
            txn,
            advance.schedule_id,
            advance.asset_id,
            advance.to,
            advance.reminder.as_ref(),
            now,
        )
        .await;
    };

    let activity_id = activity.id;
    let mut active: maintenance_activities::ActiveModel = activity.into();
    active.scheduled_at = Set(advance.to);
    active.status = Set(ActivityStatus::Pending);
    active.updated_at = Set(now);
    active.update(txn).await?;

    if let Some(plan) = &advance.reminder {
        let moved = maintenance_reminders::Entity::update_many()
            .col_expr(
                maintenance_reminders::Column::RemindOn,
                Expr::value(plan.remind_on),
            )
            .filter(maintenance_reminders::Column::ActivityId.eq(activity_id))
            .filter(maintenance_reminders::Column::Notified.eq(false))
            .filter(maintenance_reminders::Column::DeletedAt.is_null())
            .exec(txn)
            .await?
            .rows_affected;

        if moved == 0 {
            maintenance_reminders::ActiveModel {
                id: Set(Uuid::new_v4()),
                schedule_id: Set(advance.schedule_id),
                activity_id: Set(activity_id),
                notification_type: Set(plan.notification_type.clone()),
                remind_on: Set(plan.remind_on),
                notified: Set(false),
                notified_at: Set(None),
                created_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(txn)
            .await?;
        }
    }

    Ok(activity_id)
}

/// Move `next_due_date` from `advance.from` to `advance.to`.
///
/// Fails with [`RepositoryError::ConcurrentUpdate`] when the schedule no
/// longer sits on `advance.from`; the caller's transaction must then be
/// abandoned.
pub(crate) async fn apply_guarded_advance(
    txn: &DatabaseTransaction,
    advance: &ScheduleAdvance,
    now: DateTime<Utc>,
) -> RepositoryResult<()> {
    let result = maintenance_schedules::Entity::update_many()
        .col_expr(
            maintenance_schedules::Column::NextDueDate,
            Expr::value(advance.to),
        )
        .col_expr(maintenance_schedules::Column::UpdatedAt, Expr::value(now))
        .filter(maintenance_schedules::Column::Id.eq(advance.schedule_id))
        .filter(maintenance_schedules::Column::NextDueDate.eq(advance.from))
        .filter(maintenance_schedules::Column::DeletedAt.is_null())
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(RepositoryError::ConcurrentUpdate {
            table: "maintenance_schedules".to_string(),
            id: advance.schedule_id,
            message: format!(
                "next_due_date is no longer {} (advance to {} skipped)",
                advance.from, advance.to
            ),
        });
    }
    Ok(())
}

/// Soft-delete schedules, their activities and their reminders.
pub(crate) async fn cascade_soft_delete(
    txn: &DatabaseTransaction,
    schedule_ids: &[Uuid],
    now: DateTime<Utc>,
) -> Result<CascadeCounts, DbErr> {
    if schedule_ids.is_empty() {
        return Ok(CascadeCounts::default());
    }

    let reminders = maintenance_reminders::Entity::update_many()
        .col_expr(maintenance_reminders::Column::DeletedAt, Expr::value(now))
        .filter(maintenance_reminders::Column::ScheduleId.is_in(schedule_ids.iter().copied()))
        .filter(maintenance_reminders::Column::DeletedAt.is_null())
        .exec(txn)
        .await?
        .rows_affected;

    let activities = maintenance_activities::Entity::update_many()
        .col_expr(maintenance_activities::Column::DeletedAt, Expr::value(now))
        .col_expr(maintenance_activities::Column::UpdatedAt, Expr::value(now))
        .filter(maintenance_activities::Column::ScheduleId.is_in(schedule_ids.iter().copied()))
        .filter(maintenance_activities::Column::DeletedAt.is_null())
        .exec(txn)
        .await?
        .rows_affected;

    let schedules = maintenance_schedules::Entity::update_many()
        .col_expr(maintenance_schedules::Column::DeletedAt, Expr::value(now))
        .col_expr(maintenance_schedules::Column::UpdatedAt, Expr::value(now))
        .filter(maintenance_schedules::Column::Id.is_in(schedule_ids.iter().copied()))
        .filter(maintenance_schedules::Column::DeletedAt.is_null())
        .exec(txn)
        .await?
        .rows_affected;

    Ok(CascadeCounts {
        schedules,
        activities,
        reminders,
    })
}

/// Map unique-constraint failures to [`RepositoryError::ConstraintViolation`].
pub(crate) fn map_insert_error(err: DbErr, constraint: &str) -> RepositoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => RepositoryError::ConstraintViolation {
            constraint: constraint.to_string(),
            message,
        },
        _ => RepositoryError::Database(err),
    }
}
