//! The daily batch jobs and the per-tenant driver they share
//!
//! A job implements [`TenantJob`]: the work for one tenant. [`run_for_tenants`]
//! walks the registry in order and runs that work for every tenant under a
//! time budget. A tenant's failure or timeout is logged and counted; it never
//! stops the remaining tenants. Only an unreadable registry aborts the run.

pub mod overdue_sweeper;
pub mod reminder_engine;
pub mod work_order_generator;

pub use overdue_sweeper::OverdueSweeper;
pub use reminder_engine::ReminderEngine;
pub use work_order_generator::WorkOrderGenerator;

use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use super::types::{JobKind, JobRunSummary, RunContext, TenantRunReport};
use crate::database::TenantContext;
use crate::database::repositories::TenantRegistry;
use crate::errors::{JobError, JobResult};

/// One job's work for a single tenant
#[async_trait::async_trait]
pub trait TenantJob: Send + Sync {
    fn kind(&self) -> JobKind;

    async fn run_tenant(
        &self,
        tenant: &TenantContext,
        ctx: &RunContext,
    ) -> JobResult<TenantRunReport>;
}

/// Run `job` for every active tenant, sequentially, in registry order
pub async fn run_for_tenants(
    job: &dyn TenantJob,
    registry: &dyn TenantRegistry,
    tenant_timeout: Duration,
    ctx: &RunContext,
) -> JobResult<JobRunSummary> {
    let kind = job.kind();
    let started = Instant::now();
    let mut summary = JobRunSummary::new(kind);

    let tenants = registry.active_tenants().await.map_err(|e| {
        error!(job = %kind, "Failed to list tenants: {}", e);
        JobError::Registry(e)
    })?;

    info!(
        job = %kind,
        tenants = tenants.len(),
        date = %ctx.today(),
        "Starting {} run",
        kind
    );

    for tenant in &tenants {
        let tenant_started = Instant::now();
        let outcome = tokio::time::timeout(tenant_timeout, job.run_tenant(tenant, ctx))
            .await
            .unwrap_or_else(|_| {
                Err(JobError::Timeout {
                    tenant: tenant.to_string(),
                    budget: tenant_timeout,
                })
            });
        let duration_ms = tenant_started.elapsed().as_millis() as u64;

        match outcome {
            Ok(report) => {
                info!(
                    job = %kind,
                    tenant = %tenant,
                    created = report.created,
                    updated = report.updated,
                    sent = report.sent,
                    errors = report.errors,
                    skipped = report.skipped,
                    duration_ms,
                    "Tenant {} finished {}",
                    tenant,
                    kind
                );
                summary.absorb(&report);
            }
            Err(e) if e.is_skip() => {
                warn!(job = %kind, tenant = %tenant, "Skipping tenant: {}", e);
                summary.tenants_skipped += 1;
            }
            Err(e) => {
                error!(job = %kind, tenant = %tenant, duration_ms, "Tenant run failed: {}", e);
                summary.tenants_failed += 1;
            }
        }
    }

    summary.duration = started.elapsed();
    info!(
        job = %kind,
        tenants_completed = summary.tenants_completed,
        tenants_skipped = summary.tenants_skipped,
        tenants_failed = summary.tenants_failed,
        created = summary.created,
        updated = summary.updated,
        sent = summary.sent,
        errors = summary.errors,
        skipped = summary.skipped,
        duration_ms = summary.duration.as_millis() as u64,
        "Completed {} run",
        kind
    );

    Ok(summary)
}
