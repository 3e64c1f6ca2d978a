//! Overdue sweep
//!
//! Flags pending activities whose scheduled date is strictly before the run
//! date. With `scheduler.overdue_in_schedule_timezone` set, "today" is instead
//! the calendar date in each schedule's own timezone, so a site ahead of UTC
//! sees its activities go overdue when its local day ends rather than when
//! the UTC day does.

use chrono::{Days, NaiveDate};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, warn};

use super::TenantJob;
use crate::database::TenantContext;
use crate::database::repositories::ActivityRepository;
use crate::errors::JobResult;
use crate::job_scheduling::types::{JobKind, RunContext, TenantRunReport};
use crate::models::PendingActivity;

pub struct OverdueSweeper {
    activities: Arc<dyn ActivityRepository>,
    schedule_timezone: bool,
}

impl OverdueSweeper {
    pub fn new(activities: Arc<dyn ActivityRepository>) -> Self {
        Self {
            activities,
            schedule_timezone: false,
        }
    }

    /// Evaluate "today" per schedule timezone rather than on the run date
    pub fn with_schedule_timezone(mut self, enabled: bool) -> Self {
        self.schedule_timezone = enabled;
        self
    }

    fn is_overdue(&self, activity: &PendingActivity, ctx: &RunContext) -> bool {
        let today = if self.schedule_timezone {
            local_today(ctx, &activity.timezone)
        } else {
            ctx.today()
        };
        activity.scheduled_at < today
    }
}

/// Today's date in `timezone`, falling back to UTC for unknown names
pub fn local_today(ctx: &RunContext, timezone: &str) -> NaiveDate {
    match timezone.parse::<Tz>() {
        Ok(tz) => ctx.now.with_timezone(&tz).date_naive(),
        Err(_) => {
            warn!("Unknown timezone '{}', using UTC", timezone);
            ctx.today()
        }
    }
}

#[async_trait::async_trait]
impl TenantJob for OverdueSweeper {
    fn kind(&self) -> JobKind {
        JobKind::Overdue
    }

    async fn run_tenant(
        &self,
        tenant: &TenantContext,
        ctx: &RunContext,
    ) -> JobResult<TenantRunReport> {
        // No zone is more than a day ahead of UTC
        let cutoff = if self.schedule_timezone {
            ctx.today()
                .checked_add_days(Days::new(1))
                .unwrap_or(NaiveDate::MAX)
        } else {
            ctx.today()
        };
        let candidates = self.activities.find_pending_before(tenant, cutoff).await?;

        let overdue: Vec<_> = candidates
            .iter()
            .filter(|activity| self.is_overdue(activity, ctx))
            .map(|activity| activity.id)
            .collect();

        debug!(
            tenant = %tenant,
            "{} of {} pending activities are past due",
            overdue.len(),
            candidates.len()
        );

        let updated = if overdue.is_empty() {
            0
        } else {
            self.activities.mark_overdue(tenant, &overdue, ctx.now).await?
        };

        Ok(TenantRunReport {
            updated,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityStatus;
    use crate::testing::InMemoryStore;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sweeper(store: &InMemoryStore) -> OverdueSweeper {
        OverdueSweeper::new(Arc::new(store.clone()))
    }

    fn local_sweeper(store: &InMemoryStore) -> OverdueSweeper {
        sweeper(store).with_schedule_timezone(true)
    }

    #[tokio::test]
    async fn test_past_pending_activity_becomes_overdue() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        let past = store.add_schedule(&tenant, "monthly", 1, date("2025-03-10"), Vec::new());
        let today = store.add_schedule(&tenant, "monthly", 1, date("2025-03-11"), Vec::new());
        let future = store.add_schedule(&tenant, "monthly", 1, date("2025-03-12"), Vec::new());

        let report = sweeper(&store)
            .run_tenant(&tenant, &RunContext::for_date(date("2025-03-11")))
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        let status = |id| store.activities_for(&tenant, id)[0].status;
        assert_eq!(status(past.id), ActivityStatus::Overdue);
        assert_eq!(status(today.id), ActivityStatus::Pending);
        assert_eq!(status(future.id), ActivityStatus::Pending);
    }

    #[tokio::test]
    async fn test_completed_and_overdue_activities_are_untouched() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        let schedule = store.add_schedule(&tenant, "monthly", 1, date("2025-03-20"), Vec::new());
        let completed =
            store.add_activity(&tenant, schedule.id, date("2025-02-01"), ActivityStatus::Completed);
        let overdue =
            store.add_activity(&tenant, schedule.id, date("2025-02-15"), ActivityStatus::Overdue);

        let report = sweeper(&store)
            .run_tenant(&tenant, &RunContext::for_date(date("2025-03-11")))
            .await
            .unwrap();

        assert_eq!(report.updated, 0);
        assert_eq!(
            store.activity(&tenant, completed).unwrap().status,
            ActivityStatus::Completed
        );
        assert_eq!(
            store.activity(&tenant, overdue).unwrap().status,
            ActivityStatus::Overdue
        );
    }

    #[tokio::test]
    async fn test_sweep_is_idempotent() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        store.add_schedule(&tenant, "monthly", 1, date("2025-03-01"), Vec::new());
        let sweeper = sweeper(&store);
        let ctx = RunContext::for_date(date("2025-03-11"));

        assert_eq!(sweeper.run_tenant(&tenant, &ctx).await.unwrap().updated, 1);
        assert_eq!(sweeper.run_tenant(&tenant, &ctx).await.unwrap().updated, 0);
    }

    #[tokio::test]
    async fn test_schedule_timezone_is_ignored_by_default() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        let auckland = store.add_schedule(&tenant, "monthly", 1, date("2025-03-10"), Vec::new());
        store.set_timezone(&tenant, auckland.id, "Pacific/Auckland");
        let los_angeles = store.add_schedule(&tenant, "monthly", 1, date("2025-03-09"), Vec::new());
        store.set_timezone(&tenant, los_angeles.id, "America/Los_Angeles");

        // 12:00 UTC on the 10th is already the 11th in Auckland
        let report = sweeper(&store)
            .run_tenant(&tenant, &RunContext::for_date(date("2025-03-10")))
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(
            store.activities_for(&tenant, auckland.id)[0].status,
            ActivityStatus::Pending
        );
        assert_eq!(
            store.activities_for(&tenant, los_angeles.id)[0].status,
            ActivityStatus::Overdue
        );
    }

    #[tokio::test]
    async fn test_zone_ahead_of_utc_goes_overdue_at_local_midnight() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        let auckland = store.add_schedule(&tenant, "monthly", 1, date("2025-03-11"), Vec::new());
        store.set_timezone(&tenant, auckland.id, "Pacific/Auckland");
        let utc = store.add_schedule(&tenant, "monthly", 1, date("2025-03-11"), Vec::new());

        // 12:00 UTC is already 01:00 on the 12th in Auckland
        let report = local_sweeper(&store)
            .run_tenant(&tenant, &RunContext::for_date(date("2025-03-11")))
            .await
            .unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(
            store.activities_for(&tenant, auckland.id)[0].status,
            ActivityStatus::Overdue
        );
        assert_eq!(
            store.activities_for(&tenant, utc.id)[0].status,
            ActivityStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_zone_behind_utc_waits_for_local_day_to_end() {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        let los_angeles = store.add_schedule(&tenant, "monthly", 1, date("2025-03-10"), Vec::new());
        store.set_timezone(&tenant, los_angeles.id, "America/Los_Angeles");
        let utc = store.add_schedule(&tenant, "monthly", 1, date("2025-03-10"), Vec::new());

        let ctx = RunContext {
            now: Utc.with_ymd_and_hms(2025, 3, 11, 2, 0, 0).unwrap(),
        };
        let report = local_sweeper(&store).run_tenant(&tenant, &ctx).await.unwrap();

        assert_eq!(report.updated, 1);
        assert_eq!(
            store.activities_for(&tenant, los_angeles.id)[0].status,
            ActivityStatus::Pending
        );
        assert_eq!(
            store.activities_for(&tenant, utc.id)[0].status,
            ActivityStatus::Overdue
        );
    }

    #[rstest]
    #[case("UTC", "2025-03-11")]
    #[case("Pacific/Auckland", "2025-03-12")]
    #[case("America/Los_Angeles", "2025-03-11")]
    #[case("Mars/Olympus_Mons", "2025-03-11")]
    #[case("", "2025-03-11")]
    fn test_local_today(#[case] timezone: &str, #[case] expected: &str) {
        let ctx = RunContext::for_date(date("2025-03-11"));
        assert_eq!(local_today(&ctx, timezone), date(expected));
    }
}
