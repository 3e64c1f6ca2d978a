//! Reminder dispatch
//!
//! Sends one email per assigned user for every un-notified reminder whose
//! date has arrived and whose activity is still pending. A reminder is marked
//! notified once at least one of its recipients accepted the email; if every
//! delivery failed it stays eligible for the next run.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::TenantJob;
use crate::database::TenantContext;
use crate::database::repositories::ReminderRepository;
use crate::errors::JobResult;
use crate::job_scheduling::types::{JobKind, RunContext, TenantRunReport};
use crate::models::ReminderDispatch;
use crate::notifications::{Mailer, ReminderEmail};

pub struct ReminderEngine {
    reminders: Arc<dyn ReminderRepository>,
    mailer: Arc<dyn Mailer>,
    template: String,
}

impl ReminderEngine {
    pub fn new(
        reminders: Arc<dyn ReminderRepository>,
        mailer: Arc<dyn Mailer>,
        template: String,
    ) -> Self {
        Self {
            reminders,
            mailer,
            template,
        }
    }

    /// Deliver one reminder to its recipients; returns whether any delivery succeeded
    async fn deliver(
        &self,
        tenant: &TenantContext,
        recipients: &[ReminderDispatch],
        report: &mut TenantRunReport,
    ) -> bool {
        let mut delivered = false;

        for dispatch in recipients {
            let Some(address) = dispatch.usable_email() else {
                debug!(
                    tenant = %tenant,
                    "User {} has no usable email address, skipping reminder {}",
                    dispatch.user_id, dispatch.reminder_id
                );
                report.skipped += 1;
                continue;
            };

            let email = ReminderEmail::for_dispatch(dispatch, &self.template);
            match self.mailer.send(address, &email).await {
                Ok(()) => {
                    report.sent += 1;
                    delivered = true;
                }
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        "Failed to send reminder {} to user {}: {}",
                        dispatch.reminder_id, dispatch.user_id, e
                    );
                    report.errors += 1;
                }
            }
        }

        delivered
    }
}

/// Group rows by reminder, keeping the order the repository returned them in
fn group_by_reminder(rows: Vec<ReminderDispatch>) -> Vec<(Uuid, Vec<ReminderDispatch>)> {
    let mut groups: Vec<(Uuid, Vec<ReminderDispatch>)> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|(id, _)| *id == row.reminder_id) {
            Some((_, group)) => group.push(row),
            None => groups.push((row.reminder_id, vec![row])),
        }
    }
    groups
}

#[async_trait::async_trait]
impl TenantJob for ReminderEngine {
    fn kind(&self) -> JobKind {
        JobKind::Reminders
    }

    async fn run_tenant(
        &self,
        tenant: &TenantContext,
        ctx: &RunContext,
    ) -> JobResult<TenantRunReport> {
        let rows = self.reminders.find_dispatchable(tenant, ctx.today()).await?;
        let mut report = TenantRunReport::default();

        for (reminder_id, recipients) in group_by_reminder(rows) {
            if !self.deliver(tenant, &recipients, &mut report).await {
                continue;
            }

            match self.reminders.mark_notified(tenant, reminder_id, ctx.now).await {
                Ok(true) => {}
                Ok(false) => debug!(
                    tenant = %tenant,
                    "Reminder {} was already marked notified", reminder_id
                ),
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        "Failed to mark reminder {} notified: {}", reminder_id, e
                    );
                    report.errors += 1;
                }
            }
        }

        Ok(report)
    }
}
