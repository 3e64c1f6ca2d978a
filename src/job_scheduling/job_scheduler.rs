//! Job scheduler service for cron-based job scheduling

use anyhow::Result;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::job_executor::JobExecutor;
use super::types::{JobKind, RunContext};
use crate::config::SchedulerConfig;

/// The cron trigger of each job
#[derive(Debug, Clone)]
pub struct CronTriggers {
    triggers: Vec<(JobKind, Schedule)>,
}

impl CronTriggers {
    pub fn from_config(config: &SchedulerConfig) -> Result<Self> {
        let triggers = [
            (JobKind::WorkOrders, &config.work_orders),
            (JobKind::Overdue, &config.overdue),
            (JobKind::Reminders, &config.reminders),
        ]
        .into_iter()
        .map(|(kind, expression)| {
            Schedule::from_str(expression)
                .map(|schedule| (kind, schedule))
                .map_err(|e| anyhow::anyhow!("Invalid cron expression for {} '{}': {}", kind, expression, e))
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(Self { triggers })
    }

    /// The next instant strictly after `after` at which any job fires, and
    /// every job firing at that instant in execution order
    pub fn next_due(&self, after: DateTime<Utc>) -> Option<(DateTime<Utc>, Vec<JobKind>)> {
        next_due(&self.triggers, after)
    }

    /// The next `count` firings after `after`
    pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<(DateTime<Utc>, Vec<JobKind>)> {
        let mut fires = Vec::with_capacity(count);
        let mut cursor = after;
        while fires.len() < count {
            let Some((at, jobs)) = self.next_due(cursor) else {
                break;
            };
            cursor = at;
            fires.push((at, jobs));
        }
        fires
    }
}

/// Fires the daily jobs on their cron triggers
pub struct JobScheduler {
    executor: Arc<JobExecutor>,
    triggers: CronTriggers,
    run_on_start: bool,
}

impl JobScheduler {
    pub fn from_config(config: &SchedulerConfig, executor: Arc<JobExecutor>) -> Result<Self> {
        Ok(Self {
            executor,
            triggers: CronTriggers::from_config(config)?,
            run_on_start: config.run_on_start,
        })
    }

    /// Run the job scheduler service
    pub async fn run(&self, cancellation_token: CancellationToken) -> Result<()> {
        info!("Starting job scheduler service");

        if self.run_on_start {
            info!("Running all jobs once at startup");
            self.executor.run_all(&RunContext::now()).await;
        }

        loop {
            let Some((at, jobs)) = self.triggers.next_due(Utc::now()) else {
                warn!("No upcoming cron triggers, job scheduler has nothing to do");
                cancellation_token.cancelled().await;
                break;
            };
            debug!(
                "Next trigger at {} for {:?}",
                at.format("%Y-%m-%d %H:%M:%S UTC"),
                jobs
            );

            let wait = (at - Utc::now()).to_std().unwrap_or_default();
            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    let ctx = RunContext { now: at };
                    for kind in jobs {
                        if let Err(e) = self.executor.run(kind, &ctx).await {
                            warn!("Scheduled {} run failed: {}", kind, e);
                        }
                    }
                }
                _ = cancellation_token.cancelled() => {
                    info!("Job scheduler received cancellation signal, shutting down");
                    break;
                }
            }
        }

        info!("Job scheduler service stopped");
        Ok(())
    }
}

fn next_due(
    triggers: &[(JobKind, Schedule)],
    after: DateTime<Utc>,
) -> Option<(DateTime<Utc>, Vec<JobKind>)> {
    let fires: Vec<(DateTime<Utc>, JobKind)> = triggers
        .iter()
        .filter_map(|(kind, schedule)| schedule.after(&after).next().map(|at| (at, *kind)))
        .collect();

    let earliest = fires.iter().map(|(at, _)| *at).min()?;
    let mut jobs: Vec<JobKind> = fires
        .into_iter()
        .filter(|(at, _)| *at == earliest)
        .map(|(_, kind)| kind)
        .collect();
    jobs.sort();
    jobs.dedup();
    Some((earliest, jobs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReminderConfig, WorkOrderConfig};
    use crate::database::TenantContext;
    use crate::job_scheduling::jobs::{OverdueSweeper, ReminderEngine, WorkOrderGenerator};
    use crate::notifications::LogMailer;
    use crate::testing::InMemoryStore;
    use chrono::{NaiveDate, TimeZone};
    use std::time::Duration;

    const NEVER: &str = "0 0 0 1 1 * 2020";

    fn executor(store: &InMemoryStore) -> Arc<JobExecutor> {
        Arc::new(JobExecutor::new(
            Arc::new(store.clone()),
            WorkOrderGenerator::new(
                Arc::new(store.clone()),
                Arc::new(store.clone()),
                WorkOrderConfig::default(),
                ReminderConfig::default(),
            ),
            OverdueSweeper::new(Arc::new(store.clone())),
            ReminderEngine::new(
                Arc::new(store.clone()),
                Arc::new(LogMailer::new("maintenance@localhost".to_string())),
                "maintenance-reminder".to_string(),
            ),
            Duration::from_secs(5),
        ))
    }

    /// A tenant with one long-overdue weekly schedule
    fn store_with_due_schedule() -> (InMemoryStore, TenantContext) {
        let store = InMemoryStore::new();
        let tenant = store.add_tenant("acme");
        store.add_stage(&tenant, true, 0);
        store.add_schedule(
            &tenant,
            "weekly",
            1,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Vec::new(),
        );
        (store, tenant)
    }

    #[tokio::test]
    async fn test_run_on_start_runs_jobs_then_stops_on_cancellation() {
        let (store, tenant) = store_with_due_schedule();
        let config = SchedulerConfig {
            run_on_start: true,
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::from_config(&config, executor(&store)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(2), scheduler.run(token))
            .await
            .expect("scheduler exits promptly once cancelled")
            .unwrap();

        assert_eq!(store.work_orders(&tenant).len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_scheduler_runs_nothing_without_run_on_start() {
        let (store, tenant) = store_with_due_schedule();
        let scheduler =
            JobScheduler::from_config(&SchedulerConfig::default(), executor(&store)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(2), scheduler.run(token))
            .await
            .expect("scheduler exits promptly once cancelled")
            .unwrap();

        assert!(store.work_orders(&tenant).is_empty());
    }

    #[tokio::test]
    async fn test_scheduler_fires_due_trigger_until_cancelled() {
        let (store, tenant) = store_with_due_schedule();
        let config = SchedulerConfig {
            work_orders: "* * * * * *".to_string(),
            overdue: NEVER.to_string(),
            reminders: NEVER.to_string(),
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::from_config(&config, executor(&store)).unwrap();
        let token = CancellationToken::new();
        let handle = tokio::spawn({
            let token = token.clone();
            async move { scheduler.run(token).await }
        });

        let mut fired = false;
        for _ in 0..50 {
            if !store.work_orders(&tenant).is_empty() {
                fired = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        token.cancel();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("scheduler exits promptly once cancelled")
            .unwrap()
            .unwrap();
        assert!(fired);
    }

    #[tokio::test]
    async fn test_scheduler_without_triggers_waits_for_cancellation() {
        let store = InMemoryStore::new();
        let config = SchedulerConfig {
            work_orders: NEVER.to_string(),
            overdue: NEVER.to_string(),
            reminders: NEVER.to_string(),
            ..SchedulerConfig::default()
        };
        let scheduler = JobScheduler::from_config(&config, executor(&store)).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(Duration::from_secs(2), scheduler.run(token))
            .await
            .expect("scheduler exits promptly once cancelled")
            .unwrap();
    }

    fn triggers(work_orders: &str, overdue: &str, reminders: &str) -> Vec<(JobKind, Schedule)> {
        vec![
            (JobKind::Reminders, Schedule::from_str(reminders).unwrap()),
            (JobKind::Overdue, Schedule::from_str(overdue).unwrap()),
            (JobKind::WorkOrders, Schedule::from_str(work_orders).unwrap()),
        ]
    }

    #[test]
    fn test_next_due_picks_earliest_trigger() {
        let triggers = triggers("0 0 1 * * *", "0 0 8 * * *", "0 0 9 * * *");
        let after = Utc.with_ymd_and_hms(2025, 3, 11, 7, 30, 0).unwrap();

        let (at, jobs) = next_due(&triggers, after).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 3, 11, 8, 0, 0).unwrap());
        assert_eq!(jobs, vec![JobKind::Overdue]);
    }

    #[test]
    fn test_next_due_is_strictly_after() {
        let triggers = triggers("0 0 1 * * *", "0 0 8 * * *", "0 0 9 * * *");
        let after = Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap();

        let (at, jobs) = next_due(&triggers, after).unwrap();
        assert_eq!(at, Utc.with_ymd_and_hms(2025, 3, 12, 1, 0, 0).unwrap());
        assert_eq!(jobs, vec![JobKind::WorkOrders]);
    }

    #[test]
    fn test_same_instant_jobs_run_in_job_order() {
        let triggers = triggers("0 0 6 * * *", "0 0 6 * * *", "0 0 6 * * *");
        let after = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();

        let (_, jobs) = next_due(&triggers, after).unwrap();
        assert_eq!(
            jobs,
            vec![JobKind::WorkOrders, JobKind::Overdue, JobKind::Reminders]
        );
    }

    #[test]
    fn test_upcoming_lists_default_day() {
        let triggers = CronTriggers::from_config(&SchedulerConfig::default()).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();

        let fires = triggers.upcoming(after, 4);
        let hours: Vec<_> = fires.iter().map(|(at, _)| at.format("%d %H").to_string()).collect();
        assert_eq!(hours, vec!["11 01", "11 08", "11 09", "12 01"]);
        assert_eq!(fires[1].1, vec![JobKind::Overdue]);
    }

    #[test]
    fn test_from_config_rejects_bad_expression() {
        let config = SchedulerConfig {
            overdue: "every day".to_string(),
            ..SchedulerConfig::default()
        };
        assert!(CronTriggers::from_config(&config).is_err());
    }

    #[test]
    fn test_expired_schedules_yield_nothing() {
        let triggers = vec![(
            JobKind::WorkOrders,
            Schedule::from_str(NEVER).unwrap(),
        )];
        let after = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        assert!(next_due(&triggers, after).is_none());
    }
}
