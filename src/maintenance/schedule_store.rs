//! Schedule lifecycle for assets
//!
//! Schedules come either from explicit caller input or from the asset's
//! product templates. The first due date is always derived through
//! [`next_due_date`](super::due_date::next_due_date) from the start date,
//! which defaults to the asset's installation date and then to today.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::due_date::{next_due_date, normalize_interval};
use super::reminder_plan;
use crate::config::ReminderConfig;
use crate::database::TenantContext;
use crate::database::repositories::ScheduleRepository;
use crate::errors::{AppError, AppResult};
use crate::models::{
    AssetContext, CascadeCounts, MaintenanceSchedule, MaintenanceTemplate, NewSchedule,
    ScheduleDraft, ScheduleType,
};

const DEFAULT_INTERVAL_UNIT: &str = "month";
const DEFAULT_TIMEZONE: &str = "UTC";

/// Creates and maintains the schedules owned by an asset
#[derive(Clone)]
pub struct ScheduleStore {
    schedules: Arc<dyn ScheduleRepository>,
    reminders: ReminderConfig,
}

impl ScheduleStore {
    pub fn new(schedules: Arc<dyn ScheduleRepository>, reminders: ReminderConfig) -> Self {
        Self {
            schedules,
            reminders,
        }
    }

    /// Create the schedules of a newly created asset.
    ///
    /// Explicit input wins; without it the product's templates are copied.
    /// Each schedule is created with its first pending activity and reminder.
    pub async fn create_for_asset(
        &self,
        tenant: &TenantContext,
        asset: &AssetContext,
        explicit: Vec<NewSchedule>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<MaintenanceSchedule>> {
        let drafts = self.resolve_drafts(tenant, asset, explicit, now).await?;
        if drafts.is_empty() {
            debug!("No maintenance schedules to create for asset {}", asset.id);
            return Ok(Vec::new());
        }

        let created = self.schedules.create_schedules(tenant, drafts, now).await?;
        info!(
            "Created {} maintenance schedules for asset {} in tenant '{}'",
            created.len(),
            asset.id,
            tenant
        );
        Ok(created)
    }

    /// Replace an asset's schedules after its product changed.
    ///
    /// Existing schedules are soft-deleted (with their activities and
    /// reminders) and the replacements inserted in the same transaction.
    pub async fn reassign_product(
        &self,
        tenant: &TenantContext,
        asset: &AssetContext,
        explicit: Vec<NewSchedule>,
        now: DateTime<Utc>,
    ) -> AppResult<(CascadeCounts, Vec<MaintenanceSchedule>)> {
        let drafts = self.resolve_drafts(tenant, asset, explicit, now).await?;
        let (removed, created) = self
            .schedules
            .replace_for_asset(tenant, asset.id, drafts, now)
            .await?;

        info!(
            "Regenerated maintenance schedules for asset {} in tenant '{}': {} removed, {} created",
            asset.id,
            tenant,
            removed.schedules,
            created.len()
        );
        Ok((removed, created))
    }

    /// Soft-delete every schedule of an asset, transitively
    pub async fn delete_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<CascadeCounts> {
        let removed = self
            .schedules
            .soft_delete_for_asset(tenant, asset_id, now)
            .await?;
        info!(
            "Deleted maintenance for asset {} in tenant '{}': {} schedules, {} activities, {} reminders",
            asset_id, tenant, removed.schedules, removed.activities, removed.reminders
        );
        Ok(removed)
    }

    pub async fn list_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> AppResult<Vec<MaintenanceSchedule>> {
        Ok(self.schedules.find_for_asset(tenant, asset_id).await?)
    }

    async fn resolve_drafts(
        &self,
        tenant: &TenantContext,
        asset: &AssetContext,
        explicit: Vec<NewSchedule>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<ScheduleDraft>> {
        let anchor = asset.installation_date.unwrap_or_else(|| now.date_naive());

        if !explicit.is_empty() {
            return explicit
                .into_iter()
                .map(|input| self.draft_from_input(asset.id, input, anchor))
                .collect();
        }

        let Some(product_id) = asset.product_id else {
            return Ok(Vec::new());
        };

        let templates = self.schedules.product_templates(tenant, product_id).await?;
        Ok(templates
            .into_iter()
            .map(|template| self.draft_from_template(asset.id, template, anchor))
            .collect())
    }

    fn draft_from_input(
        &self,
        asset_id: Uuid,
        input: NewSchedule,
        anchor: NaiveDate,
    ) -> AppResult<ScheduleDraft> {
        if input.title.trim().is_empty() {
            return Err(AppError::validation("schedule title must not be empty"));
        }
        if let Some(value) = input.interval_value {
            if value < 1 {
                return Err(AppError::validation(format!(
                    "interval_value must be at least 1 (got {value})"
                )));
            }
        }

        let schedule_type = normalize_schedule_type(input.schedule_type.as_deref());
        let interval_value = normalize_interval(input.interval_value);
        let start_date = input.start_date.unwrap_or(anchor);
        let next_due = input.next_due_date.unwrap_or_else(|| {
            next_due_date(start_date, ScheduleType::parse(&schedule_type), interval_value)
        });

        Ok(ScheduleDraft {
            asset_id,
            title: input.title,
            description: input.description,
            schedule_type,
            interval_unit: input
                .interval_unit
                .filter(|unit| !unit.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_INTERVAL_UNIT.to_string()),
            interval_value,
            start_date,
            next_due_date: next_due,
            assigned_user_ids: input.assigned_user_ids,
            timezone: input
                .timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            reminder: reminder_plan(&self.reminders, next_due),
        })
    }

    fn draft_from_template(
        &self,
        asset_id: Uuid,
        template: MaintenanceTemplate,
        anchor: NaiveDate,
    ) -> ScheduleDraft {
        let schedule_type = normalize_schedule_type(Some(&template.schedule_type));
        let interval_value = normalize_interval(Some(template.interval_value));
        let next_due = next_due_date(anchor, ScheduleType::parse(&schedule_type), interval_value);

        ScheduleDraft {
            asset_id,
            title: template.title,
            description: template.description,
            schedule_type,
            interval_unit: if template.interval_unit.trim().is_empty() {
                DEFAULT_INTERVAL_UNIT.to_string()
            } else {
                template.interval_unit
            },
            interval_value,
            start_date: anchor,
            next_due_date: next_due,
            assigned_user_ids: Vec::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            reminder: reminder_plan(&self.reminders, next_due),
        }
    }
}

/// Stored form of a schedule type: trimmed and lower-cased. Unknown values
/// are kept as-is and read back as monthly.
fn normalize_schedule_type(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_ascii_lowercase(),
        None => ScheduleType::Monthly.as_str().to_string(),
    }
}
