//! Request types for the Settlement Engine API.
//!
//! Bodies that map one-to-one onto an engine type (a manual attendance
//! entry, a KPI entry) use that type directly; the rest are defined here.

use serde::{Deserialize, Serialize};

use crate::models::{AttendanceEntry, Month};

/// Request body for `POST /attendance/uploads`.
///
/// `records` is the normalized output of the file-ingestion step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// The reporting branch.
    pub branch_id: String,
    /// The month the batch covers.
    pub month: Month,
    /// Name of the source file, kept on the upload status.
    pub file_name: String,
    /// One row per (employee, date).
    #[serde(default)]
    pub records: Vec<AttendanceEntry>,
}

/// Request body for `POST /attendance/corrections`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    /// The corrected attendance.
    #[serde(flatten)]
    pub entry: AttendanceEntry,
    /// Why the record is being corrected.
    pub reason: String,
}

/// Request body for `POST /attendance/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessAttendanceRequest {
    /// The month to process.
    pub month: Month,
    /// Restricts processing to one branch and bypasses the readiness gate.
    #[serde(default)]
    pub branch_id: Option<String>,
}

/// Request body for endpoints addressing one employee's month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeMonthRequest {
    /// The employee.
    pub employee_id: String,
    /// The month.
    pub month: Month,
}

/// Request body for `POST /performance/rank`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    /// The month to rank.
    pub month: Month,
    /// Restricts ranking to one department.
    #[serde(default)]
    pub department_id: Option<String>,
}

/// Request body for `POST /payroll/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessPayrollRequest {
    /// The month to pay.
    pub month: Month,
    /// Bypasses the branch readiness gate.
    #[serde(default)]
    pub force_replace: bool,
}
