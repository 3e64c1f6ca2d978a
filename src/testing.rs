//! In-memory implementation of the repository traits for unit tests
//!
//! Mirrors the SeaORM repositories' semantics (guarded advances, one work
//! order per occurrence, soft deletes) and adds knobs for failure injection:
//! failing or slow tenants, failing occurrences and an unavailable registry.

use chrono::{DateTime, Days, NaiveDate, Utc};
use sea_orm::DbErr;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use crate::database::TenantContext;
use crate::database::repositories::{
    ActivityRepository, ReminderRepository, ScheduleRepository, TenantRegistry,
    WorkOrderRepository,
};
use crate::errors::{RepositoryError, RepositoryResult};
use crate::models::{
    ActivityCompletion, ActivityStatus, AssetContext, CascadeCounts, MaintenanceActivity,
    MaintenanceSchedule, MaintenanceTemplate, OccurrencePlan, PendingActivity, Reminder,
    ReminderDispatch, ReminderPlan, ScheduleAdvance, ScheduleDraft,
};

/// A work order written by `generate_occurrence`
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWorkOrder {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub occurrence_date: NaiveDate,
    pub stage_id: Uuid,
    pub title: String,
    pub severity: String,
    pub category: String,
    pub asset_id: Uuid,
    pub sop_ids: Vec<Uuid>,
    pub location_ids: Vec<Uuid>,
    pub assigned_user_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone)]
struct Stage {
    id: Uuid,
    is_default: bool,
    position: i32,
}

#[derive(Default)]
struct TenantData {
    assets: Vec<AssetContext>,
    templates: Vec<MaintenanceTemplate>,
    stages: Vec<Stage>,
    users: HashMap<Uuid, Option<String>>,
    schedules: Vec<MaintenanceSchedule>,
    activities: Vec<MaintenanceActivity>,
    reminders: Vec<Reminder>,
    work_orders: Vec<GeneratedWorkOrder>,
    deleted: HashSet<Uuid>,
}

impl TenantData {
    fn live_schedule(&self, id: Uuid) -> Option<&MaintenanceSchedule> {
        self.schedules
            .iter()
            .find(|s| s.id == id && !self.deleted.contains(&s.id))
    }

    fn check_advance(&self, advance: &ScheduleAdvance) -> RepositoryResult<()> {
        match self.live_schedule(advance.schedule_id) {
            Some(schedule) if schedule.next_due_date == advance.from => Ok(()),
            _ => Err(RepositoryError::ConcurrentUpdate {
                table: "maintenance_schedules".to_string(),
                id: advance.schedule_id,
                message: format!("next_due_date is no longer {}", advance.from),
            }),
        }
    }

    fn set_next_due(&mut self, advance: &ScheduleAdvance, now: DateTime<Utc>) {
        if let Some(schedule) = self
            .schedules
            .iter_mut()
            .find(|s| s.id == advance.schedule_id)
        {
            schedule.next_due_date = advance.to;
            schedule.updated_at = now;
        }
    }

    fn insert_upcoming(
        &mut self,
        schedule_id: Uuid,
        asset_id: Uuid,
        scheduled_at: NaiveDate,
        reminder: Option<&ReminderPlan>,
    ) -> Uuid {
        let activity_id = Uuid::new_v4();
        self.activities.push(MaintenanceActivity {
            id: activity_id,
            schedule_id,
            asset_id,
            status: ActivityStatus::Pending,
            scheduled_at,
            completed_by: None,
            completed_on: None,
            duration_minutes: None,
            work_order_id: None,
        });
        if let Some(plan) = reminder {
            self.reminders.push(Reminder {
                id: Uuid::new_v4(),
                schedule_id,
                activity_id,
                notification_type: plan.notification_type.clone(),
                remind_on: plan.remind_on,
                notified: false,
                notified_at: None,
            });
        }
        activity_id
    }

    /// Move the upcoming activity at `advance.from` to `advance.to`, or insert
    /// one if the schedule has none.
    fn roll_upcoming(&mut self, advance: &ScheduleAdvance) {
        let position = self.activities.iter().position(|a| {
            a.schedule_id == advance.schedule_id
                && a.scheduled_at == advance.from
                && a.status != ActivityStatus::Completed
                && a.work_order_id.is_none()
                && !self.deleted.contains(&a.id)
        });

        let Some(index) = position else {
            self.insert_upcoming(
                advance.schedule_id,
                advance.asset_id,
                advance.to,
                advance.reminder.as_ref(),
            );
            return;
        };
        let activity = &mut self.activities[index];
        activity.scheduled_at = advance.to;
        activity.status = ActivityStatus::Pending;
        let activity_id = activity.id;

        let Some(plan) = &advance.reminder else {
            return;
        };
        let deleted = &self.deleted;
        let mut moved = false;
        for reminder in self
            .reminders
            .iter_mut()
            .filter(|r| r.activity_id == activity_id && !r.notified && !deleted.contains(&r.id))
        {
            reminder.remind_on = plan.remind_on;
            moved = true;
        }
        if !moved {
            self.reminders.push(Reminder {
                id: Uuid::new_v4(),
                schedule_id: advance.schedule_id,
                activity_id,
                notification_type: plan.notification_type.clone(),
                remind_on: plan.remind_on,
                notified: false,
                notified_at: None,
            });
        }
    }

    fn insert_drafts(
        &mut self,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> Vec<MaintenanceSchedule> {
        let mut created = Vec::new();
        for draft in drafts {
            let schedule = MaintenanceSchedule {
                id: Uuid::new_v4(),
                asset_id: draft.asset_id,
                title: draft.title,
                description: draft.description,
                schedule_type: draft.schedule_type,
                interval_unit: draft.interval_unit,
                interval_value: draft.interval_value,
                start_date: draft.start_date,
                next_due_date: draft.next_due_date,
                assigned_user_ids: draft.assigned_user_ids,
                timezone: draft.timezone,
                created_at: now,
                updated_at: now,
            };
            self.insert_upcoming(
                schedule.id,
                schedule.asset_id,
                schedule.next_due_date,
                Some(&draft.reminder),
            );
            self.schedules.push(schedule.clone());
            created.push(schedule);
        }
        created
    }

    fn cascade(&mut self, asset_id: Uuid) -> CascadeCounts {
        let schedule_ids: HashSet<Uuid> = self
            .schedules
            .iter()
            .filter(|s| s.asset_id == asset_id && !self.deleted.contains(&s.id))
            .map(|s| s.id)
            .collect();

        let mut counts = CascadeCounts::default();
        let reminder_ids: Vec<Uuid> = self
            .reminders
            .iter()
            .filter(|r| schedule_ids.contains(&r.schedule_id) && !self.deleted.contains(&r.id))
            .map(|r| r.id)
            .collect();
        let activity_ids: Vec<Uuid> = self
            .activities
            .iter()
            .filter(|a| schedule_ids.contains(&a.schedule_id) && !self.deleted.contains(&a.id))
            .map(|a| a.id)
            .collect();

        counts.schedules = schedule_ids.len() as u64;
        counts.activities = activity_ids.len() as u64;
        counts.reminders = reminder_ids.len() as u64;
        self.deleted.extend(schedule_ids);
        self.deleted.extend(activity_ids);
        self.deleted.extend(reminder_ids);
        counts
    }
}

#[derive(Default)]
struct Inner {
    registry: Vec<TenantContext>,
    data: HashMap<TenantContext, TenantData>,
    failing_tenants: HashSet<TenantContext>,
    delays: HashMap<TenantContext, Duration>,
    failing_schedules: HashSet<Uuid>,
    registry_down: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

fn injected(message: &str) -> RepositoryError {
    RepositoryError::Database(DbErr::Custom(message.to_string()))
}

fn default_reminder(occurrence: NaiveDate) -> ReminderPlan {
    ReminderPlan {
        remind_on: occurrence - Days::new(7),
        notification_type: "email".to_string(),
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn with_tenant<R>(
        &self,
        tenant: &TenantContext,
        f: impl FnOnce(&mut TenantData) -> RepositoryResult<R>,
    ) -> RepositoryResult<R> {
        let mut inner = self.lock();
        if inner.failing_tenants.contains(tenant) {
            return Err(injected("tenant unavailable"));
        }
        f(inner.data.entry(tenant.clone()).or_default())
    }

    fn data<R>(&self, tenant: &TenantContext, f: impl FnOnce(&mut TenantData) -> R) -> R {
        let mut inner = self.lock();
        f(inner.data.entry(tenant.clone()).or_default())
    }

    async fn pause(&self, tenant: &TenantContext) {
        let delay = self.lock().delays.get(tenant).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    // Fixtures

    pub fn add_tenant(&self, schema: &str) -> TenantContext {
        let tenant = TenantContext::new(schema).unwrap();
        let mut inner = self.lock();
        inner.registry.push(tenant.clone());
        inner.data.entry(tenant.clone()).or_default();
        tenant
    }

    pub fn add_stage(&self, tenant: &TenantContext, is_default: bool, position: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.data(tenant, |data| {
            data.stages.push(Stage {
                id,
                is_default,
                position,
            })
        });
        id
    }

    pub fn add_user(&self, tenant: &TenantContext, email: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        self.data(tenant, |data| {
            data.users.insert(id, email.map(str::to_string));
        });
        id
    }

    pub fn add_asset(
        &self,
        tenant: &TenantContext,
        product_id: Option<Uuid>,
        installation_date: Option<NaiveDate>,
    ) -> AssetContext {
        let asset = AssetContext {
            id: Uuid::new_v4(),
            name: "Air handler".to_string(),
            product_id,
            installation_date,
            sop_ids: vec![Uuid::new_v4()],
            incident_plan_ids: Vec::new(),
            file_ids: Vec::new(),
            location_ids: vec![Uuid::new_v4()],
        };
        self.data(tenant, |data| data.assets.push(asset.clone()));
        asset
    }

    pub fn remove_asset(&self, tenant: &TenantContext, asset_id: Uuid) {
        self.data(tenant, |data| {
            data.deleted.insert(asset_id);
        });
    }

    pub fn add_template(
        &self,
        tenant: &TenantContext,
        product_id: Uuid,
        title: &str,
        schedule_type: &str,
        interval_value: i32,
    ) {
        self.data(tenant, |data| {
            data.templates.push(MaintenanceTemplate {
                id: Uuid::new_v4(),
                product_id,
                title: title.to_string(),
                description: None,
                schedule_type: schedule_type.to_string(),
                interval_unit: String::new(),
                interval_value,
            })
        });
    }

    /// A schedule on a fresh asset, with its upcoming activity and a reminder
    /// seven days ahead of it
    pub fn add_schedule(
        &self,
        tenant: &TenantContext,
        schedule_type: &str,
        interval_value: u32,
        next_due_date: NaiveDate,
        assigned_user_ids: Vec<Uuid>,
    ) -> MaintenanceSchedule {
        let asset = self.add_asset(tenant, None, None);
        self.data(tenant, |data| {
            data.insert_drafts(
                vec![ScheduleDraft {
                    asset_id: asset.id,
                    title: "Replace filters".to_string(),
                    description: None,
                    schedule_type: schedule_type.to_string(),
                    interval_unit: "month".to_string(),
                    interval_value,
                    start_date: next_due_date,
                    next_due_date,
                    assigned_user_ids,
                    timezone: "UTC".to_string(),
                    reminder: default_reminder(next_due_date),
                }],
                Utc::now(),
            )
            .remove(0)
        })
    }

    pub fn set_timezone(&self, tenant: &TenantContext, schedule_id: Uuid, timezone: &str) {
        self.data(tenant, |data| {
            if let Some(schedule) = data.schedules.iter_mut().find(|s| s.id == schedule_id) {
                schedule.timezone = timezone.to_string();
            }
        });
    }

    pub fn add_activity(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
        scheduled_at: NaiveDate,
        status: ActivityStatus,
    ) -> Uuid {
        self.data(tenant, |data| {
            let asset_id = data
                .live_schedule(schedule_id)
                .map(|s| s.asset_id)
                .unwrap_or_default();
            let id = data.insert_upcoming(schedule_id, asset_id, scheduled_at, None);
            if let Some(activity) = data.activities.iter_mut().find(|a| a.id == id) {
                activity.status = status;
            }
            id
        })
    }

    pub fn set_activity_status(&self, tenant: &TenantContext, id: Uuid, status: ActivityStatus) {
        self.data(tenant, |data| {
            if let Some(activity) = data.activities.iter_mut().find(|a| a.id == id) {
                activity.status = status;
            }
        });
    }

    pub fn link_work_order(&self, tenant: &TenantContext, activity_id: Uuid, work_order_id: Uuid) {
        self.data(tenant, |data| {
            if let Some(activity) = data.activities.iter_mut().find(|a| a.id == activity_id) {
                activity.work_order_id = Some(work_order_id);
            }
        });
    }

    pub fn mark_reminder_notified(&self, tenant: &TenantContext, reminder_id: Uuid) {
        self.data(tenant, |data| {
            if let Some(reminder) = data.reminders.iter_mut().find(|r| r.id == reminder_id) {
                reminder.notified = true;
                reminder.notified_at = Some(Utc::now());
            }
        });
    }

    pub fn fail_tenant(&self, tenant: &TenantContext) {
        self.lock().failing_tenants.insert(tenant.clone());
    }

    pub fn delay_tenant(&self, tenant: &TenantContext, delay: Duration) {
        self.lock().delays.insert(tenant.clone(), delay);
    }

    pub fn fail_generation_for(&self, schedule_id: Uuid) {
        self.lock().failing_schedules.insert(schedule_id);
    }

    pub fn take_registry_down(&self) {
        self.lock().registry_down = true;
    }

    // Inspection

    pub fn schedule(&self, tenant: &TenantContext, id: Uuid) -> Option<MaintenanceSchedule> {
        self.data(tenant, |data| data.live_schedule(id).cloned())
    }

    pub fn schedules(&self, tenant: &TenantContext) -> Vec<MaintenanceSchedule> {
        self.data(tenant, |data| {
            data.schedules
                .iter()
                .filter(|s| !data.deleted.contains(&s.id))
                .cloned()
                .collect()
        })
    }

    pub fn activities_for(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> Vec<MaintenanceActivity> {
        self.data(tenant, |data| {
            data.activities
                .iter()
                .filter(|a| a.schedule_id == schedule_id && !data.deleted.contains(&a.id))
                .cloned()
                .collect()
        })
    }

    pub fn activity(&self, tenant: &TenantContext, id: Uuid) -> Option<MaintenanceActivity> {
        self.data(tenant, |data| {
            data.activities.iter().find(|a| a.id == id).cloned()
        })
    }

    pub fn reminders_for(&self, tenant: &TenantContext, schedule_id: Uuid) -> Vec<Reminder> {
        self.data(tenant, |data| {
            data.reminders
                .iter()
                .filter(|r| r.schedule_id == schedule_id && !data.deleted.contains(&r.id))
                .cloned()
                .collect()
        })
    }

    pub fn work_orders(&self, tenant: &TenantContext) -> Vec<GeneratedWorkOrder> {
        self.data(tenant, |data| data.work_orders.clone())
    }
}

#[async_trait::async_trait]
impl TenantRegistry for InMemoryStore {
    async fn active_tenants(&self) -> RepositoryResult<Vec<TenantContext>> {
        let inner = self.lock();
        if inner.registry_down {
            return Err(injected("registry unavailable"));
        }
        Ok(inner.registry.clone())
    }
}

#[async_trait::async_trait]
impl ScheduleRepository for InMemoryStore {
    async fn find_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceSchedule>> {
        self.with_tenant(tenant, |data| Ok(data.live_schedule(schedule_id).cloned()))
    }

    async fn find_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        self.with_tenant(tenant, |data| {
            let mut found: Vec<_> = data
                .schedules
                .iter()
                .filter(|s| s.asset_id == asset_id && !data.deleted.contains(&s.id))
                .cloned()
                .collect();
            found.sort_by_key(|s| (s.next_due_date, s.id));
            Ok(found)
        })
    }

    async fn find_due(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        self.pause(tenant).await;
        self.with_tenant(tenant, |data| {
            let mut due: Vec<_> = data
                .schedules
                .iter()
                .filter(|s| s.next_due_date <= today && !data.deleted.contains(&s.id))
                .cloned()
                .collect();
            due.sort_by_key(|s| (s.next_due_date, s.id));
            Ok(due)
        })
    }

    async fn find_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
    ) -> RepositoryResult<Option<AssetContext>> {
        self.with_tenant(tenant, |data| {
            Ok(data
                .assets
                .iter()
                .find(|a| a.id == asset_id && !data.deleted.contains(&a.id))
                .cloned())
        })
    }

    async fn product_templates(
        &self,
        tenant: &TenantContext,
        product_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceTemplate>> {
        self.with_tenant(tenant, |data| {
            Ok(data
                .templates
                .iter()
                .filter(|t| t.product_id == product_id)
                .cloned()
                .collect())
        })
    }

    async fn create_schedules(
        &self,
        tenant: &TenantContext,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Vec<MaintenanceSchedule>> {
        self.with_tenant(tenant, |data| Ok(data.insert_drafts(drafts, now)))
    }

    async fn replace_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        drafts: Vec<ScheduleDraft>,
        now: DateTime<Utc>,
    ) -> RepositoryResult<(CascadeCounts, Vec<MaintenanceSchedule>)> {
        self.with_tenant(tenant, |data| {
            let removed = data.cascade(asset_id);
            Ok((removed, data.insert_drafts(drafts, now)))
        })
    }

    async fn soft_delete_for_asset(
        &self,
        tenant: &TenantContext,
        asset_id: Uuid,
        _now: DateTime<Utc>,
    ) -> RepositoryResult<CascadeCounts> {
        self.with_tenant(tenant, |data| Ok(data.cascade(asset_id)))
    }

    async fn advance_schedule(
        &self,
        tenant: &TenantContext,
        advance: ScheduleAdvance,
        now: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        self.with_tenant(tenant, |data| {
            data.check_advance(&advance)?;
            data.set_next_due(&advance, now);
            data.roll_upcoming(&advance);
            Ok(())
        })
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryStore {
    async fn find_activity(
        &self,
        tenant: &TenantContext,
        activity_id: Uuid,
    ) -> RepositoryResult<Option<MaintenanceActivity>> {
        self.with_tenant(tenant, |data| {
            Ok(data
                .activities
                .iter()
                .find(|a| a.id == activity_id && !data.deleted.contains(&a.id))
                .cloned())
        })
    }

    async fn find_for_schedule(
        &self,
        tenant: &TenantContext,
        schedule_id: Uuid,
    ) -> RepositoryResult<Vec<MaintenanceActivity>> {
        self.with_tenant(tenant, |data| {
            let mut found: Vec<_> = data
                .activities
                .iter()
                .filter(|a| a.schedule_id == schedule_id && !data.deleted.contains(&a.id))
                .cloned()
                .collect();
            found.sort_by_key(|a| a.scheduled_at);
            Ok(found)
        })
    }

    async fn complete_activity(
        &self,
        tenant: &TenantContext,
        completion: ActivityCompletion,
        advance: Option<ScheduleAdvance>,
    ) -> RepositoryResult<MaintenanceActivity> {
        self.with_tenant(tenant, |data| {
            let current = data
                .activities
                .iter()
                .find(|a| a.id == completion.activity_id && !data.deleted.contains(&a.id))
                .cloned()
                .ok_or_else(|| {
                    RepositoryError::not_found("maintenance_activities", "id", completion.activity_id)
                })?;
            if current.status == ActivityStatus::Completed {
                return Err(RepositoryError::validation("activity is already completed"));
            }
            if let Some(advance) = &advance {
                data.check_advance(advance)?;
            }

            let mut updated = current;
            updated.status = ActivityStatus::Completed;
            updated.completed_by = completion.completed_by;
            updated.completed_on = Some(completion.completed_on);
            updated.duration_minutes = completion.duration_minutes;
            if let Some(activity) = data.activities.iter_mut().find(|a| a.id == updated.id) {
                *activity = updated.clone();
            }

            if let Some(advance) = advance {
                data.set_next_due(&advance, completion.completed_on);
                data.insert_upcoming(
                    advance.schedule_id,
                    advance.asset_id,
                    advance.to,
                    advance.reminder.as_ref(),
                );
            }
            Ok(updated)
        })
    }

    async fn find_pending_before(
        &self,
        tenant: &TenantContext,
        cutoff: NaiveDate,
    ) -> RepositoryResult<Vec<PendingActivity>> {
        self.pause(tenant).await;
        self.with_tenant(tenant, |data| {
            Ok(data
                .activities
                .iter()
                .filter(|a| {
                    a.status == ActivityStatus::Pending
                        && a.scheduled_at < cutoff
                        && !data.deleted.contains(&a.id)
                })
                .filter_map(|a| {
                    data.live_schedule(a.schedule_id).map(|s| PendingActivity {
                        id: a.id,
                        schedule_id: a.schedule_id,
                        scheduled_at: a.scheduled_at,
                        timezone: s.timezone.clone(),
                    })
                })
                .collect())
        })
    }

    async fn mark_overdue(
        &self,
        tenant: &TenantContext,
        activity_ids: &[Uuid],
        _now: DateTime<Utc>,
    ) -> RepositoryResult<u64> {
        self.with_tenant(tenant, |data| {
            let mut changed = 0;
            for activity in data.activities.iter_mut() {
                if activity_ids.contains(&activity.id) && activity.status == ActivityStatus::Pending
                {
                    activity.status = ActivityStatus::Overdue;
                    changed += 1;
                }
            }
            Ok(changed)
        })
    }
}

#[async_trait::async_trait]
impl WorkOrderRepository for InMemoryStore {
    async fn default_stage(&self, tenant: &TenantContext) -> RepositoryResult<Option<Uuid>> {
        self.with_tenant(tenant, |data| {
            let mut stages = data.stages.clone();
            stages.sort_by_key(|s| (!s.is_default, s.position));
            Ok(stages.first().map(|s| s.id))
        })
    }

    async fn generate_occurrence(
        &self,
        tenant: &TenantContext,
        plan: OccurrencePlan,
        now: DateTime<Utc>,
    ) -> RepositoryResult<Uuid> {
        if self.lock().failing_schedules.contains(&plan.schedule_id) {
            return Err(injected("insert failed"));
        }

        self.with_tenant(tenant, |data| {
            data.check_advance(&plan.advance)?;
            if data.work_orders.iter().any(|wo| {
                wo.schedule_id == plan.schedule_id && wo.occurrence_date == plan.occurrence_date
            }) {
                return Err(RepositoryError::ConstraintViolation {
                    constraint: "uq_work_orders_schedule_occurrence".to_string(),
                    message: "duplicate occurrence".to_string(),
                });
            }

            let work_order_id = Uuid::new_v4();
            data.work_orders.push(GeneratedWorkOrder {
                id: work_order_id,
                schedule_id: plan.schedule_id,
                occurrence_date: plan.occurrence_date,
                stage_id: plan.stage_id,
                title: plan.title.clone(),
                severity: plan.severity.clone(),
                category: plan.category.clone(),
                asset_id: plan.asset.id,
                sop_ids: plan.asset.sop_ids.clone(),
                location_ids: plan.asset.location_ids.clone(),
                assigned_user_ids: (!plan.assigned_user_ids.is_empty())
                    .then(|| plan.assigned_user_ids.clone()),
            });

            data.set_next_due(&plan.advance, now);
            data.roll_upcoming(&plan.advance);
            Ok(work_order_id)
        })
    }
}

#[async_trait::async_trait]
impl ReminderRepository for InMemoryStore {
    async fn find_dispatchable(
        &self,
        tenant: &TenantContext,
        today: NaiveDate,
    ) -> RepositoryResult<Vec<ReminderDispatch>> {
        self.pause(tenant).await;
        self.with_tenant(tenant, |data| {
            let mut reminders: Vec<&Reminder> = data
                .reminders
                .iter()
                .filter(|r| !r.notified && r.remind_on <= today && !data.deleted.contains(&r.id))
                .collect();
            reminders.sort_by_key(|r| (r.remind_on, r.id));

            let mut dispatches = Vec::new();
            for reminder in reminders {
                let Some(activity) = data.activities.iter().find(|a| {
                    a.id == reminder.activity_id
                        && a.status == ActivityStatus::Pending
                        && !data.deleted.contains(&a.id)
                }) else {
                    continue;
                };
                let Some(schedule) = data.live_schedule(reminder.schedule_id) else {
                    continue;
                };
                for user_id in &schedule.assigned_user_ids {
                    dispatches.push(ReminderDispatch {
                        reminder_id: reminder.id,
                        schedule_id: schedule.id,
                        activity_id: activity.id,
                        schedule_title: schedule.title.clone(),
                        asset_id: schedule.asset_id,
                        asset_name: None,
                        scheduled_at: activity.scheduled_at,
                        user_id: *user_id,
                        email: data.users.get(user_id).cloned().flatten(),
                        display_name: None,
                    });
                }
            }
            Ok(dispatches)
        })
    }

    async fn mark_notified(
        &self,
        tenant: &TenantContext,
        reminder_id: Uuid,
        at: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        self.with_tenant(tenant, |data| {
            match data
                .reminders
                .iter_mut()
                .find(|r| r.id == reminder_id && !r.notified)
            {
                Some(reminder) => {
                    reminder.notified = true;
                    reminder.notified_at = Some(at);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }
}
