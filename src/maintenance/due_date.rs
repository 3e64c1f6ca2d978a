//! Next-due-date arithmetic for recurring schedules
//!
//! Month-based rules use calendar arithmetic that clamps to the last day of
//! the target month, so a schedule anchored on the 31st lands on Feb 28 (or
//! 29) rather than spilling into March. Results saturate at
//! [`NaiveDate::MAX`].

use chrono::{Days, Months, NaiveDate};

use crate::models::ScheduleType;

/// Compute the due date that follows `base`.
///
/// `interval_value` is the number of schedule units to move; values below 1
/// are treated as 1.
pub fn next_due_date(base: NaiveDate, schedule_type: ScheduleType, interval_value: u32) -> NaiveDate {
    let interval = interval_value.max(1);

    let next = match schedule_type {
        ScheduleType::Daily => base.checked_add_days(Days::new(u64::from(interval))),
        ScheduleType::Weekly => base.checked_add_days(Days::new(u64::from(interval) * 7)),
        ScheduleType::Monthly => base.checked_add_months(Months::new(interval)),
        ScheduleType::Quarterly => base.checked_add_months(Months::new(interval.saturating_mul(3))),
        ScheduleType::Annually => {
            base.checked_add_months(Months::new(interval.saturating_mul(12)))
        }
    };

    next.unwrap_or(NaiveDate::MAX)
}

/// [`next_due_date`] for values as they are stored: free-text type and a
/// nullable signed interval.
pub fn next_due_date_from_raw(
    base: NaiveDate,
    schedule_type: &str,
    interval_value: Option<i32>,
) -> NaiveDate {
    next_due_date(
        base,
        ScheduleType::parse(schedule_type),
        normalize_interval(interval_value),
    )
}

/// Absent or non-positive intervals count as 1.
pub fn normalize_interval(interval_value: Option<i32>) -> u32 {
    interval_value
        .and_then(|value| u32::try_from(value).ok())
        .filter(|value| *value >= 1)
        .unwrap_or(1)
}
