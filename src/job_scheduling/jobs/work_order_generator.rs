//! Work-order generation
//!
//! For each schedule due on or before today, in due-date order: create a work
//! order in the tenant's default stage, link the asset's context and the
//! assigned users, and advance the schedule by one period from its current
//! due date. Each occurrence is applied atomically by the repository; a
//! failed occurrence is counted and stays due for the next run.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::TenantJob;
use crate::config::{ReminderConfig, WorkOrderConfig};
use crate::database::TenantContext;
use crate::database::repositories::{ScheduleRepository, WorkOrderRepository};
use crate::errors::{JobError, JobResult, RepositoryResult};
use crate::job_scheduling::types::{JobKind, RunContext, TenantRunReport};
use crate::maintenance::plan_advance;
use crate::models::{MaintenanceSchedule, OccurrencePlan};

enum Occurrence {
    Generated(Uuid),
    AssetMissing,
}

pub struct WorkOrderGenerator {
    schedules: Arc<dyn ScheduleRepository>,
    work_orders: Arc<dyn WorkOrderRepository>,
    defaults: WorkOrderConfig,
    reminders: ReminderConfig,
}

impl WorkOrderGenerator {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        work_orders: Arc<dyn WorkOrderRepository>,
        defaults: WorkOrderConfig,
        reminders: ReminderConfig,
    ) -> Self {
        Self {
            schedules,
            work_orders,
            defaults,
            reminders,
        }
    }

    async fn generate(
        &self,
        tenant: &TenantContext,
        schedule: &MaintenanceSchedule,
        stage_id: Uuid,
        ctx: &RunContext,
    ) -> RepositoryResult<Occurrence> {
        let advance = plan_advance(schedule, &self.reminders);

        let Some(asset) = self.schedules.find_asset(tenant, schedule.asset_id).await? else {
            warn!(
                tenant = %tenant,
                "Asset {} of schedule {} no longer exists; advancing to {} without a work order",
                schedule.asset_id, schedule.id, advance.to
            );
            self.schedules
                .advance_schedule(tenant, advance, ctx.now)
                .await?;
            return Ok(Occurrence::AssetMissing);
        };

        let plan = OccurrencePlan {
            schedule_id: schedule.id,
            occurrence_date: schedule.next_due_date,
            title: schedule.title.clone(),
            description: schedule.description.clone(),
            stage_id,
            severity: self.defaults.default_severity.clone(),
            category: self.defaults.default_category.clone(),
            asset,
            assigned_user_ids: schedule.assigned_user_ids.clone(),
            advance,
        };

        let id = self
            .work_orders
            .generate_occurrence(tenant, plan, ctx.now)
            .await?;
        Ok(Occurrence::Generated(id))
    }
}

#[async_trait::async_trait]
impl TenantJob for WorkOrderGenerator {
    fn kind(&self) -> JobKind {
        JobKind::WorkOrders
    }

    async fn run_tenant(
        &self,
        tenant: &TenantContext,
        ctx: &RunContext,
    ) -> JobResult<TenantRunReport> {
        let stage_id = self
            .work_orders
            .default_stage(tenant)
            .await?
            .ok_or_else(|| JobError::MissingDefaultStage {
                tenant: tenant.to_string(),
            })?;

        let due = self.schedules.find_due(tenant, ctx.today()).await?;
        let mut report = TenantRunReport::default();

        for schedule in &due {
            match self.generate(tenant, schedule, stage_id, ctx).await {
                Ok(Occurrence::Generated(work_order_id)) => {
                    debug!(
                        tenant = %tenant,
                        "Generated work order {} for schedule {} ({})",
                        work_order_id, schedule.id, schedule.next_due_date
                    );
                    report.created += 1;
                }
                Ok(Occurrence::AssetMissing) => report.errors += 1,
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        transient = e.is_transient(),
                        "Failed to generate work order for schedule {} ({}): {}",
                        schedule.id, schedule.next_due_date, e
                    );
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }
}
