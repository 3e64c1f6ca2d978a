//! Job executor service for performing the actual work

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{error, info};

use super::jobs::{OverdueSweeper, ReminderEngine, TenantJob, WorkOrderGenerator, run_for_tenants};
use super::types::{JobKind, JobRunSummary, RunContext};
use crate::config::{Config, TenantSource};
use crate::database::repositories::{
    ActivitySeaOrmRepository, ReminderSeaOrmRepository, ScheduleSeaOrmRepository,
    StaticTenantRegistry, TenantRegistry, TenantSeaOrmRepository, WorkOrderSeaOrmRepository,
};
use crate::database::{Database, TenantContext};
use crate::errors::JobResult;
use crate::notifications::Mailer;

/// Runs the daily jobs across every tenant
pub struct JobExecutor {
    registry: Arc<dyn TenantRegistry>,
    work_orders: WorkOrderGenerator,
    overdue: OverdueSweeper,
    reminders: ReminderEngine,
    tenant_timeout: Duration,
}

impl JobExecutor {
    pub fn new(
        registry: Arc<dyn TenantRegistry>,
        work_orders: WorkOrderGenerator,
        overdue: OverdueSweeper,
        reminders: ReminderEngine,
        tenant_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            work_orders,
            overdue,
            reminders,
            tenant_timeout,
        }
    }

    /// Wire the jobs to the SeaORM repositories and the configured tenant source
    pub fn from_config(
        database: &Database,
        config: &Config,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let connection = database.connection();
        let schedules = Arc::new(ScheduleSeaOrmRepository::new(connection.clone()));

        Ok(Self::new(
            tenant_registry(database, config)?,
            WorkOrderGenerator::new(
                schedules,
                Arc::new(WorkOrderSeaOrmRepository::new(connection.clone())),
                config.work_orders.clone(),
                config.reminders.clone(),
            ),
            OverdueSweeper::new(Arc::new(ActivitySeaOrmRepository::new(connection.clone())))
                .with_schedule_timezone(config.scheduler.overdue_in_schedule_timezone),
            ReminderEngine::new(
                Arc::new(ReminderSeaOrmRepository::new(connection)),
                mailer,
                config.reminders.template.clone(),
            ),
            config.scheduler.tenant_timeout()?,
        ))
    }

    pub fn registry(&self) -> Arc<dyn TenantRegistry> {
        self.registry.clone()
    }

    fn job(&self, kind: JobKind) -> &dyn TenantJob {
        match kind {
            JobKind::WorkOrders => &self.work_orders,
            JobKind::Overdue => &self.overdue,
            JobKind::Reminders => &self.reminders,
        }
    }

    /// Execute one job for all tenants
    pub async fn run(&self, kind: JobKind, ctx: &RunContext) -> JobResult<JobRunSummary> {
        info!("Executing {} job for {}", kind, ctx.today());
        run_for_tenants(self.job(kind), self.registry.as_ref(), self.tenant_timeout, ctx).await
    }

    /// Execute every job in order; a failed job does not prevent the next one
    pub async fn run_all(&self, ctx: &RunContext) -> Vec<JobResult<JobRunSummary>> {
        let mut results = Vec::new();
        for kind in JobKind::iter() {
            let result = self.run(kind, ctx).await;
            if let Err(e) = &result {
                error!("{} job failed: {}", kind, e);
            }
            results.push(result);
        }
        results
    }
}

fn tenant_registry(database: &Database, config: &Config) -> Result<Arc<dyn TenantRegistry>> {
    match config.tenants.source {
        TenantSource::Database => Ok(Arc::new(TenantSeaOrmRepository::new(database.connection()))),
        TenantSource::Static => {
            let tenants = config
                .tenants
                .schemas
                .iter()
                .map(|schema| TenantContext::new(schema.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Arc::new(StaticTenantRegistry::new(tenants)))
        }
    }
}
