//! Work-day calendar evaluation.
//!
//! Decides whether a date is a scheduled work day under a [`ShiftPolicy`].

use chrono::{Datelike, NaiveDate, Weekday};

use crate::models::{Month, ShiftPolicy, WorkDaysType};

/// Length of one on/off cycle of a four-on four-off rotation, in days.
pub const ROTATION_CYCLE_DAYS: i64 = 8;

/// Days on duty at the start of each rotation cycle.
pub const ROTATION_ON_DAYS: i64 = 4;

/// Returns true if `date` is a scheduled work day under `policy`.
///
/// - `MON_FRI`: Monday through Friday.
/// - `DAILY`: every day.
/// - `ROTATING_4_4`: four days on, four days off, counted from the policy's
///   rotation anchor. Without an anchor the first day of `date`'s month
///   starts the cycle.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::is_scheduled_day;
/// use settlement_engine::models::{ShiftPolicy, WorkDaysType};
/// use chrono::{NaiveDate, NaiveTime};
///
/// let policy = ShiftPolicy::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     WorkDaysType::MonFri,
/// ).unwrap();
///
/// // 2025-03-08 is a Saturday
/// assert!(!is_scheduled_day(&policy, NaiveDate::from_ymd_opt(2025, 3, 8).unwrap()));
/// assert!(is_scheduled_day(&policy, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
/// ```
pub fn is_scheduled_day(policy: &ShiftPolicy, date: NaiveDate) -> bool {
    match policy.work_days_type {
        WorkDaysType::MonFri => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
        WorkDaysType::Daily => true,
        WorkDaysType::Rotating4x4 => {
            let anchor = policy
                .rotation_anchor
                .unwrap_or_else(|| Month::of(date).first_day());
            (date - anchor).num_days().rem_euclid(ROTATION_CYCLE_DAYS) < ROTATION_ON_DAYS
        }
    }
}

/// Counts the scheduled work days of `month` under `policy`.
pub fn scheduled_days_in(policy: &ShiftPolicy, month: Month) -> u32 {
    month.days().filter(|d| is_scheduled_day(policy, *d)).count() as u32
}
