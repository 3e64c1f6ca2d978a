//! SeaORM work order repository
//!
//! Generation of one occurrence is a single transaction. The schedule
//! advance goes first and is guarded on the old due date, so a repeated or
//! concurrent attempt for the same occurrence fails before anything is
//! written; the unique `(maintenance_schedule_id, occurrence_date)` index
//! backs this up at the database level.
//!
//! The occurrence is recorded by the work order's
//! `(maintenance_schedule_id, occurrence_date)`; the schedule's upcoming
//! activity is carried forward to the new due date rather than duplicated.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use uuid::Uuid;

use super::traits::WorkOrderRepository;
use super::{apply_guarded_advance, map_insert_error, roll_upcoming_activity};
use crate::database::TenantContext;
use crate::entities::{
    prelude::*, work_order_assets, work_order_assignments, work_order_stages, work_orders,
};
use crate::errors::RepositoryResult;
use crate::models::{OccurrencePlan, WORK_ORDER_SOURCE};

const OCCURRENCE_CONSTRAINT: &str = "uq_work_orders_schedule_occurrence";

/// SeaORM-based work order repository
#[derive(Clone)]
pub struct WorkOrderSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl WorkOrderSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait::async_trait]
impl WorkOrderRepository for WorkOrderSeaOrmRepository {
    async fn default_stage(&self, tenant: &TenantContext) -> RepositoryResult<Option<Uuid>> {
        let txn = tenant.begin(&*self.connection).await?;
        let stage = WorkOrderStages::find()
            .order_by_desc(work_order_stages::Column::IsDefault)
            .order_by_asc(work_order_stages::Column::Position)
            .order_by_asc(work_order_stages::Column::Name)
            .one(&txn)
            .await?;
        txn.commit().await?;
        Ok(stage.map(|stage| stage.id))
    }

    async fn generate_occurrence(
        &self,
        tenant: &TenantContext,
        plan: OccurrencePlan,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Uuid> {
        let txn = tenant.begin(&*self.connection).await?;

        apply_guarded_advance(&txn, &plan.advance, now).await?;

        let work_order_id = Uuid::new_v4();
        work_orders::ActiveModel {
            id: Set(work_order_id),
            title: Set(plan.title),
            description: Set(plan.description),
            stage_id: Set(plan.stage_id),
            severity: Set(plan.severity),
            category: Set(plan.category),
            source: Set(WORK_ORDER_SOURCE.to_string()),
            maintenance_schedule_id: Set(Some(plan.schedule_id)),
            occurrence_date: Set(Some(plan.occurrence_date)),
            due_date: Set(Some(plan.occurrence_date)),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| map_insert_error(e, OCCURRENCE_CONSTRAINT))?;

        work_order_assets::ActiveModel {
            id: Set(Uuid::new_v4()),
            work_order_id: Set(work_order_id),
            asset_id: Set(plan.asset.id),
            sop_ids: Set(plan.asset.sop_ids.into()),
            incident_plan_ids: Set(plan.asset.incident_plan_ids.into()),
            file_ids: Set(plan.asset.file_ids.into()),
            location_ids: Set(plan.asset.location_ids.into()),
        }
        .insert(&txn)
        .await?;

        if !plan.assigned_user_ids.is_empty() {
            work_order_assignments::ActiveModel {
                id: Set(Uuid::new_v4()),
                work_order_id: Set(work_order_id),
                user_ids: Set(plan.assigned_user_ids.into()),
            }
            .insert(&txn)
            .await?;
        }

        // The work order now tracks this occurrence; the schedule's single
        // pending activity moves on to the next one.
        roll_upcoming_activity(&txn, &plan.advance, now).await?;

        txn.commit().await?;
        Ok(work_order_id)
    }
}
