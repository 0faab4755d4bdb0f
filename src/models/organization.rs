//! Organisation reference data.
//!
//! Employees, job roles, departments and branches are read-only lookups for
//! the engine. They are maintained by the HR configuration surface and
//! loaded from `organization.yaml`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ShiftPolicy;

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    /// Currently employed; included in monthly processing.
    #[default]
    Active,
    /// Temporarily inactive; excluded from monthly processing.
    Inactive,
    /// No longer employed.
    Terminated,
}

/// A physical or organisational attendance-reporting unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// Unique identifier for the branch.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-text location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Inactive branches are not required to report before a month can close.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// A department; performance ranks are assigned within a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique identifier for the department.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A job role. Shift policy, salary structure and KPI template hang off it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRole {
    /// Unique identifier for the job role.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Department the role belongs to.
    pub department_id: String,
    /// Expected work window and calendar, if configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_policy: Option<ShiftPolicy>,
}

/// An employee subject to attendance settlement and payroll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier (employee code).
    pub id: String,
    /// Full display name.
    pub full_name: String,
    /// Department used for ranking.
    pub department_id: String,
    /// Branch the employee reports attendance through.
    pub branch_id: String,
    /// Job role, if assigned.
    #[serde(default)]
    pub job_role_id: Option<String>,
    /// Employment status.
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    /// Last day of probation, if the employee is or was on probation.
    #[serde(default)]
    pub probation_end_date: Option<NaiveDate>,
}

impl Employee {
    /// Returns true if the employee takes part in monthly processing.
    pub fn is_active(&self) -> bool {
        self.employment_status == EmploymentStatus::Active
    }

    /// Returns true if the employee is still on probation at `date`.
    pub fn on_probation_at(&self, date: NaiveDate) -> bool {
        self.probation_end_date.is_some_and(|end| date <= end)
    }
}

fn default_true() -> bool {
    true
}
