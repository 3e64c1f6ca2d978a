//! Repository traits for tenant-scoped data access
//!
//! Every call takes the [`TenantContext`] it operates in; implementations
//! open a tenant-scoped transaction per call (or per plan) and never reach
//! across tenants. The jobs depend on these traits only, which keeps them
//! testable without a database.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::database::TenantContext;
use crate::errors::RepositoryResult;
use crate::models::{
    ActivityCompletion, AssetContext, CascadeCounts, MaintenanceActivity, MaintenanceSchedule,
    MaintenanceTemplate, OccurrencePlan, PendingActivity, ReminderDispatch, ScheduleAdvance,
    ScheduleDraft,
};

/// Source of the tenants a job run iterates
#[async_trait::async_trait]
pub trait TenantRegistry: Send + Sync {
    /// Active tenants in processing order
    async fn active_tenants(&self) -> RepositoryResult<Vec<TenantContext>>;
}

#[async_trait::async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn find_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceSchedule>>;

    /// Active schedules of one asset
    async fn find_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>>;

    /// Active schedules with `next_due_date <= today`, oldest first
    async fn find_due(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>>;

    /// Non-deleted asset by id
    async fn find_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Option<AssetContext>>;

    /// Default maintenance templates of a product, in display order
    async fn product_templates(
        &self,
        tenant: &TenantContext,
        product_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceTemplate>>;

    /// Insert schedules, each with its first pending activity and reminder,
    /// in one transaction
    async fn create_schedules(
        &self,
        tenant: &TenantContext,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>>;

    /// Soft-delete the asset's schedules and insert `drafts` in their place,
    /// in one transaction
    async fn replace_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<(CascadeCounts, Vec<MaintenanceSchedule>)>;

    /// Soft-delete the asset's schedules with their activities and reminders
    async fn soft_delete_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        now: DateTime<Utc>,
    ) -> RepositoryResult<CascadeCounts>;

    /// Move a schedule to its next due date without generating a work order.
    ///
    /// The upcoming pending activity is re-dated rather than duplicated.
    async fn advance_schedule(
        &self,
        tenant: &TenantContext,
        advance: ScheduleAdvance,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()>;
}

#[async_trait::async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn find_activity(
        &self,
        tenant: &TenantContext,
        activity_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceActivity>>;

    async fn find_for_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceActivity>>;

    /// Mark an activity completed, optionally advancing its schedule in the
    /// same transaction
    async fn complete_activity(
        &self,
        tenant: &TenantContext,
        completion: ActivityCompletion,
        advance: Option<ScheduleAdvance>,
    ) -> RepositoryResult<MaintenanceActivity>;

    /// Pending activities scheduled before `cutoff`, with their schedule's timezone
    async fn find_pending_before(
        &self,
        tenant: &TenantContext,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PendingActivity>>;

    /// Flip the given activities to overdue if they are still pending.
    /// Returns the number of rows changed.
    async fn mark_overdue(
        &self,
        tenant: &TenantContext,
        activity_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> RepositoryResult<u64>;
}

#[async_trait::async_trait]
pub trait WorkOrderRepository: Send + Sync {
    /// Stage flagged `is_default`, else the lowest-positioned stage
    async fn default_stage(&self, tenant: &TenantContext) -> RepositoryResult<Option<Uuid>>;

    /// Apply an occurrence plan atomically and return the new work order id
    async fn generate_occurrence(
        &self,
        tenant: &TenantContext,
        plan: OccurrencePlan,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Uuid>;
}

#[async_trait::async_trait]
pub trait ReminderRepository: Send + Sync {
    /// One row per (un-notified due reminder, assigned user)
    async fn find_dispatchable(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<ReminderDispatch>>;

    /// Set `notified` if it is not set yet. Returns whether this call set it.
    async fn mark_notified(
        &self,
        tenant: &TenantContext,
        reminder_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<bool>;
}
