//! Monthly attendance aggregation for one employee.
//!
//! Classifies every day of a month, applies the cross-day QUERY rule,
//! prices the late and absent days and recommends a disciplinary action.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{AttendanceRules, DisciplineRules};
use crate::models::{
    AttendanceRecord, DailyClassification, DailyOutcome, DisciplinaryAction,
    DisciplinaryActionType, Month, MonthlyAttendanceSummary, SalaryStructure, ShiftPolicy,
};

use super::classify_day;

/// Returns the dates on which the QUERY rule fires.
///
/// Severe days (LATE_1HR or ABSENT) are counted in date order, and a QUERY
/// is raised each time the running count reaches a multiple of
/// `trigger_count`. A trigger count of zero never fires.
///
/// # Examples
///
/// ```
/// use settlement_engine::calculation::query_trigger_dates;
/// use settlement_engine::models::{DailyClassification, DailyOutcome};
/// use chrono::NaiveDate;
///
/// let days: Vec<DailyClassification> = (3..=9)
///     .map(|d| DailyClassification {
///         date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
///         outcome: DailyOutcome::Absent,
///         late_minutes: 0,
///     })
///     .collect();
///
/// let dates = query_trigger_dates(&days, 3);
/// assert_eq!(dates.len(), 2);
/// assert_eq!(dates[0], NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
/// ```
pub fn query_trigger_dates(days: &[DailyClassification], trigger_count: u32) -> Vec<NaiveDate> {
    if trigger_count == 0 {
        return Vec::new();
    }
    let mut severe = 0u32;
    let mut dates = Vec::new();
    for day in days.iter().filter(|d| d.outcome.is_severe()) {
        severe += 1;
        if severe % trigger_count == 0 {
            dates.push(day.date);
        }
    }
    dates
}

/// Picks the escalation for a month's counters, most severe first.
pub fn disciplinary_action(
    total_query: u32,
    total_late_days: u32,
    rules: &DisciplineRules,
) -> Option<DisciplinaryAction> {
    if total_query > 0 {
        Some(DisciplinaryAction {
            action_type: DisciplinaryActionType::QueryLetter,
            reason: format!(
                "{} query trigger(s) for repeated severe lateness or absence",
                total_query
            ),
        })
    } else if total_late_days > rules.hr_review_after_late_days {
        Some(DisciplinaryAction {
            action_type: DisciplinaryActionType::HrReview,
            reason: format!(
                "{} late days exceeds the HR review limit of {}",
                total_late_days, rules.hr_review_after_late_days
            ),
        })
    } else if total_late_days > rules.warning_after_late_days {
        Some(DisciplinaryAction {
            action_type: DisciplinaryActionType::Warning,
            reason: format!(
                "{} late days exceeds the warning limit of {}",
                total_late_days, rules.warning_after_late_days
            ),
        })
    } else {
        None
    }
}

/// Builds the monthly attendance summary of one employee.
///
/// `records` may contain records of any date; only those inside `month` are
/// considered. The result depends on nothing but the arguments, so running
/// it twice over the same inputs gives the same summary.
///
/// Counters are taken from the per-day classification. A QUERY is an
/// overlay: the day it fires on is reported as `QUERY` in `days`, while its
/// underlying LATE_1HR or ABSENT outcome still counts toward its own
/// counter and deduction.
pub fn summarize_month(
    employee_id: &str,
    month: Month,
    records: &[AttendanceRecord],
    policy: &ShiftPolicy,
    salary: &SalaryStructure,
    attendance_rules: &AttendanceRules,
    discipline_rules: &DisciplineRules,
) -> MonthlyAttendanceSummary {
    let by_date: BTreeMap<NaiveDate, &AttendanceRecord> = records
        .iter()
        .filter(|r| month.contains(r.date))
        .map(|r| (r.date, r))
        .collect();

    let mut days: Vec<DailyClassification> = month
        .days()
        .map(|date| classify_day(date, by_date.get(&date).copied(), policy, attendance_rules))
        .collect();

    let mut scheduled_days = 0u32;
    let mut present_days = 0u32;
    let mut total_late_30 = 0u32;
    let mut total_late_1hr = 0u32;
    let mut absent_days = 0u32;
    let mut total_late_minutes = 0i64;

    for day in &days {
        if day.outcome == DailyOutcome::OffDay {
            continue;
        }
        scheduled_days += 1;
        total_late_minutes += day.late_minutes;
        match day.outcome {
            DailyOutcome::Absent => absent_days += 1,
            DailyOutcome::Late30 => total_late_30 += 1,
            DailyOutcome::Late1Hr => total_late_1hr += 1,
            _ => {}
        }
        if day.outcome != DailyOutcome::Absent {
            present_days += 1;
        }
    }

    let query_dates = query_trigger_dates(&days, attendance_rules.query_trigger_count);
    for day in days.iter_mut() {
        if query_dates.contains(&day.date) {
            day.outcome = DailyOutcome::Query;
        }
    }

    let total_query = query_dates.len() as u32;
    let total_late_days = total_late_30 + total_late_1hr;
    let late_deduction_amount = Decimal::from(total_late_days) * salary.late_deduction_rate;
    let absent_deduction_amount = Decimal::from(absent_days) * salary.absent_deduction_rate;

    MonthlyAttendanceSummary {
        employee_id: employee_id.to_string(),
        month,
        scheduled_days,
        present_days,
        total_late_30,
        total_late_1hr,
        total_query,
        total_late_days,
        absent_days,
        total_late_minutes,
        query_dates,
        late_deduction_amount,
        absent_deduction_amount,
        salary_deduction_amount: late_deduction_amount + absent_deduction_amount,
        disciplinary_action: disciplinary_action(total_query, total_late_days, discipline_rules),
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceSource, WorkDaysType};
    use chrono::NaiveTime;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    fn policy() -> ShiftPolicy {
        ShiftPolicy::new(time(9, 0), time(17, 0), WorkDaysType::MonFri).unwrap()
    }

    fn salary() -> SalaryStructure {
        SalaryStructure {
            job_role_id: "role_cashier".to_string(),
            basic_salary: dec("200000"),
            housing_allowance: Decimal::ZERO,
            transport_allowance: Decimal::ZERO,
            medical_allowance: Decimal::ZERO,
            utility_allowance: Decimal::ZERO,
            other_allowances: Decimal::ZERO,
            late_deduction_rate: dec("500"),
            absent_deduction_rate: dec("1000"),
        }
    }

    /// One record per weekday of March 2025, checked in at `default_in`,
    /// with per-day overrides (`None` removes the record).
    fn month_records(
        default_in: NaiveTime,
        overrides: &[(u32, Option<NaiveTime>)],
    ) -> Vec<AttendanceRecord> {
        march()
            .days()
            .filter(|d| crate::calculation::is_scheduled_day(&policy(), *d))
            .filter_map(|date| {
                let day = chrono::Datelike::day(&date);
                let check_in = match overrides.iter().find(|(d, _)| *d == day) {
                    Some((_, None)) => return None,
                    Some((_, Some(t))) => *t,
                    None => default_in,
                };
                Some(AttendanceRecord {
                    employee_id: "EMP-001".to_string(),
                    date,
                    branch_id: "br_ogb".to_string(),
                    check_in: Some(check_in),
                    check_out: Some(time(17, 0)),
                    source: AttendanceSource::Upload,
                })
            })
            .collect()
    }

    fn summarize(records: &[AttendanceRecord]) -> MonthlyAttendanceSummary {
        summarize_month(
            "EMP-001",
            march(),
            records,
            &policy(),
            &salary(),
            &AttendanceRules::default(),
            &DisciplineRules::default(),
        )
    }

    /// MA-001: a perfect month
    #[test]
    fn test_perfect_month() {
        let summary = summarize(&month_records(time(8, 55), &[]));
        assert_eq!(summary.scheduled_days, 21);
        assert_eq!(summary.present_days, 21);
        assert_eq!(summary.total_late_days, 0);
        assert_eq!(summary.absent_days, 0);
        assert_eq!(summary.salary_deduction_amount, Decimal::ZERO);
        assert!(summary.disciplinary_action.is_none());
        assert_eq!(summary.days.len(), 31);
    }

    /// MA-002: late and absent days are counted and priced
    #[test]
    fn test_counts_and_deductions() {
        // 3rd, 4th LATE_30; 5th LATE_1HR; 6th absent
        let records = month_records(
            time(9, 0),
            &[(3, Some(time(9, 40))), (4, Some(time(9, 31))), (5, Some(time(10, 15))), (6, None)],
        );
        let summary = summarize(&records);
        assert_eq!(summary.total_late_30, 2);
        assert_eq!(summary.total_late_1hr, 1);
        assert_eq!(summary.total_late_days, 3);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.present_days, 20);
        assert_eq!(summary.total_late_minutes, 40 + 31 + 75);
        assert_eq!(summary.late_deduction_amount, dec("1500"));
        assert_eq!(summary.absent_deduction_amount, dec("1000"));
        assert_eq!(summary.salary_deduction_amount, dec("2500"));
        assert_eq!(summary.total_query, 0);
    }

    /// MA-003: the third severe day raises a QUERY overlay
    #[test]
    fn test_query_overlay() {
        let records = month_records(
            time(9, 0),
            &[(3, None), (4, Some(time(10, 30))), (5, None), (6, None)],
        );
        let summary = summarize(&records);
        assert_eq!(summary.total_query, 1);
        assert_eq!(summary.query_dates, vec![NaiveDate::from_ymd_opt(2025, 3, 5).unwrap()]);
        // underlying counters are unchanged by the overlay
        assert_eq!(summary.absent_days, 3);
        assert_eq!(summary.total_late_1hr, 1);
        let fifth = summary.days.iter().find(|d| d.date.to_string() == "2025-03-05").unwrap();
        assert_eq!(fifth.outcome, DailyOutcome::Query);
        assert_eq!(
            summary.disciplinary_action.unwrap().action_type,
            DisciplinaryActionType::QueryLetter
        );
    }

    /// MA-004: a zero trigger count disables the QUERY rule
    #[test]
    fn test_query_disabled() {
        let records = month_records(time(9, 0), &[(3, None), (4, None), (5, None)]);
        let rules = AttendanceRules {
            query_trigger_count: 0,
            ..AttendanceRules::default()
        };
        let summary = summarize_month(
            "EMP-001",
            march(),
            &records,
            &policy(),
            &salary(),
            &rules,
            &DisciplineRules::default(),
        );
        assert_eq!(summary.total_query, 0);
        assert!(summary.disciplinary_action.is_none());
    }

    /// MA-005: lateness escalates to warning then HR review
    #[test]
    fn test_disciplinary_escalation() {
        let rules = DisciplineRules::default();
        assert!(disciplinary_action(0, 3, &rules).is_none());
        assert_eq!(
            disciplinary_action(0, 4, &rules).unwrap().action_type,
            DisciplinaryActionType::Warning
        );
        assert_eq!(
            disciplinary_action(0, 6, &rules).unwrap().action_type,
            DisciplinaryActionType::HrReview
        );
        assert_eq!(
            disciplinary_action(1, 0, &rules).unwrap().action_type,
            DisciplinaryActionType::QueryLetter
        );
    }

    /// MA-006: weekend records and records of other months are ignored
    #[test]
    fn test_ignores_off_days_and_other_months() {
        let mut records = month_records(time(9, 0), &[]);
        records.push(AttendanceRecord {
            employee_id: "EMP-001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 8).unwrap(),
            branch_id: "br_ogb".to_string(),
            check_in: Some(time(11, 0)),
            check_out: None,
            source: AttendanceSource::Manual,
        });
        records.push(AttendanceRecord {
            employee_id: "EMP-001".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            branch_id: "br_ogb".to_string(),
            check_in: Some(time(11, 0)),
            check_out: None,
            source: AttendanceSource::Upload,
        });
        let summary = summarize(&records);
        assert_eq!(summary.total_late_days, 0);
        assert_eq!(summary.present_days, 21);
    }

    /// MA-007: identical inputs give identical summaries
    #[test]
    fn test_repeatable() {
        let records = month_records(time(9, 45), &[(12, None)]);
        assert_eq!(summarize(&records), summarize(&records));
    }

    #[test]
    fn test_query_trigger_multiples() {
        let days: Vec<DailyClassification> = (1..=7)
            .map(|d| DailyClassification {
                date: NaiveDate::from_ymd_opt(2025, 3, d).unwrap(),
                outcome: if d % 2 == 0 { DailyOutcome::OnTime } else { DailyOutcome::Late1Hr },
                late_minutes: 0,
            })
            .collect();
        // severe on 1, 3, 5, 7
        let dates = query_trigger_dates(&days, 2);
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
            ]
        );
    }
}
