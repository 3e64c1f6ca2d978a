//! Job scheduling type definitions

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use strum::EnumIter;

/// The daily batch jobs.
///
/// Declaration order is execution order when several jobs fall due at the
/// same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    WorkOrders,
    Overdue,
    Reminders,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::WorkOrders => "work-orders",
            JobKind::Overdue => "overdue",
            JobKind::Reminders => "reminders",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clock reading a job run works against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    pub now: DateTime<Utc>,
}

impl RunContext {
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// Replay a run for a specific calendar date (noon UTC, so every zone
    /// within twelve hours of UTC sees the same local date)
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            now: date
                .and_hms_opt(12, 0, 0)
                .unwrap_or_default()
                .and_utc(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}

/// Outcome of one job for one tenant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TenantRunReport {
    /// Work orders created
    pub created: u64,
    /// Activities flipped to overdue
    pub updated: u64,
    /// Reminder emails delivered
    pub sent: u64,
    /// Occurrence or recipient level failures
    pub errors: u64,
    /// Rows deliberately passed over (e.g. recipients without an address)
    pub skipped: u64,
}

/// Aggregate outcome of one job across all tenants
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRunSummary {
    pub job: JobKind,
    pub tenants_completed: u64,
    pub tenants_skipped: u64,
    pub tenants_failed: u64,
    pub created: u64,
    pub updated: u64,
    pub sent: u64,
    pub errors: u64,
    pub skipped: u64,
    #[serde(skip)]
    pub duration: Duration,
}

impl JobRunSummary {
    pub fn new(job: JobKind) -> Self {
        Self {
            job,
            tenants_completed: 0,
            tenants_skipped: 0,
            tenants_failed: 0,
            created: 0,
            updated: 0,
            sent: 0,
            errors: 0,
            skipped: 0,
            duration: Duration::ZERO,
        }
    }

    pub fn absorb(&mut self, report: &TenantRunReport) {
        self.tenants_completed += 1;
        self.created += report.created;
        self.updated += report.updated;
        self.sent += report.sent;
        self.errors += report.errors;
        self.skipped += report.skipped;
    }
}
