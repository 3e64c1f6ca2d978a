//! SeaORM schedule repository
//!
//! Schedules, the assets they belong to and the product templates they are
//! copied from.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::traits::ScheduleRepository;
use super::{
    apply_guarded_advance, cascade_soft_delete, insert_upcoming_activity, roll_upcoming_activity,
};
use crate::database::TenantContext;
use crate::entities::{assets, maintenance_schedules, prelude::*, product_maintenance_templates};
use crate::errors::RepositoryResult;
use crate::maintenance::due_date::normalize_interval;
use crate::models::{
    AssetContext, CascadeCounts, MaintenanceSchedule, MaintenanceTemplate, ScheduleAdvance,
    ScheduleDraft,
};

/// SeaORM-based schedule repository
#[derive(Clone)]
pub struct ScheduleSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ScheduleSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    async fn insert_drafts(
        txn: &DatabaseTransaction,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        let mut created = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let model = maintenance_schedules::ActiveModel {
                id: Set(Uuid::new_v4()),
                asset_id: Set(draft.asset_id),
                title: Set(draft.title),
                description: Set(draft.description),
                schedule_type: Set(draft.schedule_type),
                interval_unit: Set(draft.interval_unit),
                interval_value: Set(i32::try_from(draft.interval_value).unwrap_or(i32::MAX)),
                start_date: Set(draft.start_date),
                next_due_date: Set(draft.next_due_date),
                assigned_user_ids: Set(draft.assigned_user_ids.into()),
                timezone: Set(draft.timezone),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(txn)
            .await?;

            insert_upcoming_activity(
                txn,
                model.id,
                model.asset_id,
                model.next_due_date,
                Some(&draft.reminder),
                now,
            )
            .await?;

            created.push(schedule_to_domain(model));
        }

        Ok(created)
    }

    async fn active_schedule_ids(
        txn: &DatabaseTransaction,
        asset_id: Uuid,
    ) -> RepositoryResult<Vec<Uuid>> {
        let ids = MaintenanceSchedules::find()
            .filter(maintenance_schedules::Column::AssetId.eq(asset_id))
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .all(txn)
            .await?
            .into_iter()
            .map(|schedule| schedule.id)
            .collect();
        Ok(ids)
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for ScheduleSeaOrmRepository {
    async fn find_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceSchedule>> {
        let txn = tenant.begin(&*self.connection).await?;
        let model = MaintenanceSchedules::find_by_id(schedule_id)
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .one(&txn)
            .await?;
        txn.commit().await?;
        Ok(model.map(schedule_to_domain))
    }

    async fn find_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        let txn = tenant.begin(&*self.connection).await?;
        let models = MaintenanceSchedules::find()
            .filter(maintenance_schedules::Column::AssetId.eq(asset_id))
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .order_by_asc(maintenance_schedules::Column::NextDueDate)
            .order_by_asc(maintenance_schedules::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;
        Ok(models.into_iter().map(schedule_to_domain).collect())
    }

    async fn find_due(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        let txn = tenant.begin(&*self.connection).await?;
        let models = MaintenanceSchedules::find()
            .filter(maintenance_schedules::Column::NextDueDate.lte(today))
            .filter(maintenance_schedules::Column::DeletedAt.is_null())
            .order_by_asc(maintenance_schedules::Column::NextDueDate)
            .order_by_asc(maintenance_schedules::Column::Id)
            .all(&txn)
            .await?;
        txn.commit().await?;

        debug!(
            "Found {} due schedules in tenant '{}' for {}",
            models.len(),
            tenant,
            today
        );
        Ok(models.into_iter().map(schedule_to_domain).collect())
    }

    async fn find_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Option<AssetContext>> {
        let txn = tenant.begin(&*self.connection).await?;
        let model = Assets::find_by_id(asset_id)
            .filter(assets::Column::DeletedAt.is_null())
            .one(&txn)
            .await?;
        txn.commit().await?;
        Ok(model.map(asset_to_domain))
    }

    async fn product_templates(
        &self,
        tenant: &TenantContext,
        product_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceTemplate>> {
        let txn = tenant.begin(&*self.connection).await?;
        let models = ProductMaintenanceTemplates::find()
            .filter(product_maintenance_templates::Column::ProductId.eq(product_id))
            .filter(product_maintenance_templates::Column::DeletedAt.is_null())
            .order_by_asc(product_maintenance_templates::Column::Position)
            .order_by_asc(product_maintenance_templates::Column::Title)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(models
            .into_iter()
            .map(|model| MaintenanceTemplate {
                id: model.id,
                product_id: model.product_id,
                title: model.title,
                description: model.description,
                schedule_type: model.schedule_type,
                interval_unit: model.interval_unit,
                interval_value: model.interval_value,
            })
            .collect())
    }

    async fn create_schedules(
        &self,
        tenant: &TenantContext,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        let txn = tenant.begin(&*self.connection).await?;
        let created = Self::insert_drafts(&txn, drafts, now).await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn replace_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<(CascadeCounts, Vec<MaintenanceSchedule>)> {
        let txn = tenant.begin(&*self.connection).await?;
        let existing = Self::active_schedule_ids(&txn, asset_id).await?;
        let removed = cascade_soft_delete(&txn, &existing, now).await?;
        let created = Self::insert_drafts(&txn, drafts, now).await?;
        txn.commit().await?;
        Ok((removed, created))
    }

    async fn soft_delete_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        now: DateTime<Utc>,
    ) -> RepositoryResult<CascadeCounts> {
        let txn = tenant.begin(&*self.connection).await?;
        let existing = Self::active_schedule_ids(&txn, asset_id).await?;
        let removed = cascade_soft_delete(&txn, &existing, now).await?;
        txn.commit().await?;
        Ok(removed)
    }

    async fn advance_schedule(
        &self,
        tenant: &TenantContext,
        advance: ScheduleAdvance,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        let txn = tenant.begin(&*self.connection).await?;
        apply_guarded_advance(&txn, &advance, now).await?;
        roll_upcoming_activity(&txn, &advance, now).await?;
        txn.commit().await?;
        Ok(())
    }
}

pub(crate) fn schedule_to_domain(model: maintenance_schedules::Model) -> MaintenanceSchedule {
    MaintenanceSchedule {
        id: model.id,
        asset_id: model.asset_id,
        title: model.title,
        description: model.description,
        schedule_type: model.schedule_type,
        interval_unit: model.interval_unit,
        interval_value: normalize_interval(Some(model.interval_value)),
        start_date: model.start_date,
        next_due_date: model.next_due_date,
        assigned_user_ids: model.assigned_user_ids.into(),
        timezone: model.timezone,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn asset_to_domain(model: assets::Model) -> AssetContext {
    AssetContext {
        id: model.id,
        name: model.name,
        product_id: model.product_id,
        installation_date: model.installation_date,
        sop_ids: model.sop_ids.into(),
        incident_plan_ids: model.incident_plan_ids.into(),
        file_ids: model.file_ids.into(),
        location_ids: model.location_ids.into(),
    }
}
