//! Job scheduling for the maintenance engine
//!
//! Three daily jobs run against every tenant:
//! - work-order generation for schedules that have fallen due
//! - the overdue sweep over pending activities
//! - reminder dispatch to assigned users
//!
//! The system is built around three components:
//! - `JobScheduler`: fires jobs on their cron triggers
//! - `JobExecutor`: runs one job across the tenant registry
//! - `jobs`: the per-tenant work of each job

pub mod job_executor;
pub mod job_scheduler;
pub mod jobs;
pub mod types;

pub use job_executor::JobExecutor;
pub use job_scheduler::{CronTriggers, JobScheduler};
pub use types::*;
