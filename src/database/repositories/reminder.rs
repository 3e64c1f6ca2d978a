//! SeaORM reminder repository

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::traits::ReminderRepository;
use crate::database::TenantContext;
use crate::entities::{
    assets, maintenance_activities, maintenance_reminders, maintenance_schedules, prelude::*,
    users,
};
use crate::errors::RepositoryResult;
use crate::models::{ActivityStatus, ReminderDispatch};

/// SeaORM-based reminder repository
#[derive(Clone)]
pub struct ReminderSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ReminderSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait::async_trait]
impl ReminderRepository for ReminderSeaOrmRepository {
    async fn find_dispatchable(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<ReminderDispatch>> {
        let txn = tenant.begin(&*self.connection).await?;

        let reminders = MaintenanceReminders::find()
            .find_also_related(MaintenanceActivities)
            .filter(maintenance_reminders::Column::Notified.eq(false))
            .filter(maintenance_reminders::Column::RemindOn.lte(today))
            .filter(maintenance_reminders::Column::DeletedAt.is_null())
            .filter(maintenance_activities::Column::Status.eq(ActivityStatus::Pending))
            .filter(maintenance_activities::Column::DeletedAt.is_null())
            .order_by_asc(maintenance_reminders::Column::RemindOn)
            .order_by_asc(maintenance_reminders::Column::Id)
            .all(&txn)
            .await?;

        if reminders.is_empty() {
            txn.commit().await?;
            return Ok(Vec::new());
        }

        let schedule_ids: Vec<Uuid> = reminders.iter().map(|(r, _)| r.schedule_id).collect();
        let schedules: HashMap<Uuid, maintenance_schedules::Model> = MaintenanceSchedules::find()
            .filter(maintenance_schedules::Column::Id.is_in(schedule_ids))
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .all(&txn)
            .await?
            .into_iter()
            .map(|schedule| (schedule.id, schedule))
            .collect();

        let user_ids: Vec<Uuid> = schedules
            .values()
            .flat_map(|schedule| schedule.assigned_user_ids.0.iter().copied())
            .collect();
        let recipients: HashMap<Uuid, users::Model> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            Users::find()
                .filter(users::Column::Id.is_in(user_ids))
                .all(&txn)
                .await?
                .into_iter()
                .map(|user| (user.id, user))
                .collect()
        };

        let asset_ids: Vec<Uuid> = schedules.values().map(|s| s.asset_id).collect();
        let asset_names: HashMap<Uuid, String> = Assets::find()
            .filter(assets::Column::Id.is_in(asset_ids))
            .all(&txn)
            .await?
            .into_iter()
            .map(|asset| (asset.id, asset.name))
            .collect();

        txn.commit().await?;

        let mut dispatches = Vec::new();
        for (reminder, activity) in reminders {
            let (Some(activity), Some(schedule)) = (activity, schedules.get(&reminder.schedule_id))
            else {
                continue;
            };

            for user_id in &schedule.assigned_user_ids.0 {
                let user = recipients.get(user_id);
                dispatches.push(ReminderDispatch {
                    reminder_id: reminder.id,
                    schedule_id: schedule.id,
                    activity_id: activity.id,
                    schedule_title: schedule.title.clone(),
                    asset_id: schedule.asset_id,
                    asset_name: asset_names.get(&schedule.asset_id).cloned(),
                    scheduled_at: activity.scheduled_at,
                    user_id: *user_id,
                    email: user.and_then(|u| u.email.clone()),
                    display_name: user.and_then(|u| u.display_name.clone()),
                });
            }
        }

        Ok(dispatches)
    }

    async fn mark_notified(
        &self,
        tenant: &TenantContext,
        reminder_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        let txn = tenant.begin(&*self.connection).await?;
        let result = MaintenanceReminders::update_many()
            .col_expr(maintenance_reminders::Column::Notified, Expr::value(true))
            .col_expr(maintenance_reminders::Column::NotifiedAt, Expr::value(Some(at)))
            .filter(maintenance_reminders::Column::Id.eq(reminder_id))
            .filter(maintenance_reminders::Column::Notified.eq(false))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(result.rows_affected == 1)
    }
}
