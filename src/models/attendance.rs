//! Attendance models.
//!
//! This module contains the stored attendance record, the derived daily
//! outcome, the per-branch upload status and the monthly summary that feeds
//! payroll.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Month;

/// Where an attendance record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceSource {
    /// Part of a branch time-log upload.
    Upload,
    /// Entered or corrected by HR.
    Manual,
}

/// One normalized attendance row as produced by the file-ingestion collaborator.
///
/// The engine only checks structural completeness (non-empty employee id);
/// date and time parsing has already happened upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEntry {
    /// Employee identifier.
    pub employee_id: String,
    /// Calendar date of the attendance.
    pub date: NaiveDate,
    /// First check-in of the day, if any.
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    /// Last check-out of the day, if any.
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
}

/// A stored attendance record. At most one exists per (employee, date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Employee identifier.
    pub employee_id: String,
    /// Calendar date of the attendance.
    pub date: NaiveDate,
    /// Branch the record was reported through.
    pub branch_id: String,
    /// First check-in of the day, if any.
    pub check_in: Option<NaiveTime>,
    /// Last check-out of the day, if any.
    pub check_out: Option<NaiveTime>,
    /// How the record entered the ledger.
    pub source: AttendanceSource,
}

impl AttendanceRecord {
    /// Builds a record from a normalized entry.
    pub fn from_entry(entry: AttendanceEntry, branch_id: &str, source: AttendanceSource) -> Self {
        Self {
            employee_id: entry.employee_id,
            date: entry.date,
            branch_id: branch_id.to_string(),
            check_in: entry.check_in,
            check_out: entry.check_out,
            source,
        }
    }
}

/// Classification of one day against a shift policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DailyOutcome {
    /// Checked in within the tolerated delay.
    OnTime,
    /// Late by at least the late threshold but less than the severe threshold.
    #[serde(rename = "LATE_30")]
    Late30,
    /// Late by at least the severe threshold.
    #[serde(rename = "LATE_1HR")]
    Late1Hr,
    /// Disciplinary trigger raised by the monthly cross-day rule.
    Query,
    /// No check-in on a scheduled work day.
    Absent,
    /// Not a scheduled work day; excluded from all counts.
    OffDay,
}

impl DailyOutcome {
    /// Returns true for outcomes that count toward the QUERY trigger.
    pub fn is_severe(&self) -> bool {
        matches!(self, DailyOutcome::Late1Hr | DailyOutcome::Absent)
    }
}

/// The classified outcome of one calendar day for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClassification {
    /// The calendar day.
    pub date: NaiveDate,
    /// The outcome for the day.
    pub outcome: DailyOutcome,
    /// Minutes between shift start and check-in, clamped at zero.
    pub late_minutes: i64,
}

/// Upload status of one branch for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchUploadStatus {
    /// The branch.
    pub branch_id: String,
    /// The month the upload covers.
    pub month: Month,
    /// True once a batch has been ingested and not cleared since.
    pub is_uploaded: bool,
    /// Name of the source file of the latest batch.
    pub file_name: String,
    /// When the latest batch was ingested.
    pub uploaded_at: DateTime<Utc>,
    /// Number of records stored from the latest batch.
    pub record_count: usize,
}

/// Escalation level derived from a month of attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisciplinaryActionType {
    /// Informal warning for repeated lateness.
    Warning,
    /// Referral to HR review.
    HrReview,
    /// Formal query letter.
    QueryLetter,
}

/// A disciplinary action recommended by the monthly aggregation.
///
/// Producing the letter text is the job of an external generator; the
/// engine only decides that a letter is due and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplinaryAction {
    /// Escalation level.
    pub action_type: DisciplinaryActionType,
    /// Human-readable reason.
    pub reason: String,
}

/// Monthly attendance counters and deductions for one employee.
///
/// Recomputed wholesale on every processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAttendanceSummary {
    /// The employee.
    pub employee_id: String,
    /// The month summarised.
    pub month: Month,
    /// Scheduled work days in the month under the employee's shift policy.
    pub scheduled_days: u32,
    /// Scheduled days with a check-in.
    pub present_days: u32,
    /// Days classified LATE_30.
    pub total_late_30: u32,
    /// Days classified LATE_1HR.
    pub total_late_1hr: u32,
    /// QUERY triggers raised by the cross-day rule.
    pub total_query: u32,
    /// LATE_30 plus LATE_1HR days.
    pub total_late_days: u32,
    /// Scheduled days without a check-in.
    pub absent_days: u32,
    /// Sum of late minutes over all scheduled days.
    pub total_late_minutes: i64,
    /// Dates on which a QUERY was raised.
    pub query_dates: Vec<NaiveDate>,
    /// `total_late_days` times the late deduction rate.
    pub late_deduction_amount: Decimal,
    /// `absent_days` times the absent deduction rate.
    pub absent_deduction_amount: Decimal,
    /// Late plus absent deduction.
    pub salary_deduction_amount: Decimal,
    /// Recommended escalation, if any.
    pub disciplinary_action: Option<DisciplinaryAction>,
    /// Per-day classification for every day of the month.
    pub days: Vec<DailyClassification>,
}
