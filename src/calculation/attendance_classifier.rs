//! Single-day attendance classification.
//!
//! Classifies one calendar day of one employee against the employee's
//! shift policy. The monthly QUERY rule spans several days and lives in the
//! summary aggregation, not here.

use chrono::{NaiveDate, NaiveTime};

use crate::config::AttendanceRules;
use crate::models::{AttendanceRecord, DailyClassification, DailyOutcome, ShiftPolicy};

use super::is_scheduled_day;

/// Minutes between the shift start and the check-in, clamped at zero.
///
/// Seconds are truncated, so a check-in at 09:00:59 for a 09:00 shift is
/// zero minutes late.
pub fn check_in_delay_minutes(shift_start: NaiveTime, check_in: NaiveTime) -> i64 {
    (check_in - shift_start).num_minutes().max(0)
}

/// Classifies one day.
///
/// Non-scheduled days are `OFF_DAY` whatever the record says. A scheduled
/// day with no record, or a record without a check-in, is `ABSENT`.
/// Otherwise the check-in delay is compared with the configured thresholds:
///
/// | Delay (defaults)        | Outcome    |
/// |-------------------------|------------|
/// | under 30 minutes        | `ON_TIME`  |
/// | 30 to 59 minutes        | `LATE_30`  |
/// | 60 minutes or more      | `LATE_1HR` |
///
/// Delays of at least `on_time_grace_minutes` but under the late threshold
/// are tolerated: the day stays `ON_TIME` but the delay is kept in
/// `late_minutes`.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::classify_day;
/// use settlement_engine::config::AttendanceRules;
/// use settlement_engine::models::{
///     AttendanceRecord, AttendanceSource, DailyOutcome, ShiftPolicy, WorkDaysType,
/// };
/// use chrono::{NaiveDate, NaiveTime};
///
/// let policy = ShiftPolicy::new(
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     WorkDaysType::MonFri,
/// ).unwrap();
/// let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
/// let record = AttendanceRecord {
///     employee_id: "EMP-001".to_string(),
///     date,
///     branch_id: "br_ogb".to_string(),
///     check_in: NaiveTime::from_hms_opt(9, 45, 0),
///     check_out: None,
///     source: AttendanceSource::Upload,
/// };
///
/// let day = classify_day(date, Some(&record), &policy, &AttendanceRules::default());
/// assert_eq!(day.outcome, DailyOutcome::Late30);
/// assert_eq!(day.late_minutes, 45);
/// ```
pub fn classify_day(
    date: NaiveDate,
    record: Option<&AttendanceRecord>,
    policy: &ShiftPolicy,
    rules: &AttendanceRules,
) -> DailyClassification {
    if !is_scheduled_day(policy, date) {
        return DailyClassification {
            date,
            outcome: DailyOutcome::OffDay,
            late_minutes: 0,
        };
    }

    let Some(check_in) = record.and_then(|r| r.check_in) else {
        return DailyClassification {
            date,
            outcome: DailyOutcome::Absent,
            late_minutes: 0,
        };
    };

    let delay = check_in_delay_minutes(policy.shift_start, check_in);
    let outcome = if delay >= rules.severe_late_threshold_minutes {
        DailyOutcome::Late1Hr
    } else if delay >= rules.late_threshold_minutes {
        DailyOutcome::Late30
    } else {
        DailyOutcome::OnTime
    };

    DailyClassification {
        date,
        outcome,
        late_minutes: if delay < rules.on_time_grace_minutes { 0 } else { delay },
    }
}
