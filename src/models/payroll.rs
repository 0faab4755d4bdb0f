//! Salary structure, payroll record and payroll run models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuditStep, AuditWarning, Month, SkippedEmployee};

/// Monthly pay components for a job role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryStructure {
    /// The job role this structure applies to.
    pub job_role_id: String,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Monthly housing allowance.
    #[serde(default)]
    pub housing_allowance: Decimal,
    /// Monthly transport allowance.
    #[serde(default)]
    pub transport_allowance: Decimal,
    /// Monthly medical allowance.
    #[serde(default)]
    pub medical_allowance: Decimal,
    /// Monthly utility allowance.
    #[serde(default)]
    pub utility_allowance: Decimal,
    /// Any other monthly allowances.
    #[serde(default)]
    pub other_allowances: Decimal,
    /// Deduction per late day.
    #[serde(default = "default_late_deduction_rate")]
    pub late_deduction_rate: Decimal,
    /// Deduction per absent day.
    #[serde(default = "default_absent_deduction_rate")]
    pub absent_deduction_rate: Decimal,
}

impl SalaryStructure {
    /// Sum of the five allowance fields.
    pub fn total_allowances(&self) -> Decimal {
        self.housing_allowance
            + self.transport_allowance
            + self.medical_allowance
            + self.utility_allowance
            + self.other_allowances
    }

    /// Basic salary plus all allowances.
    pub fn gross(&self) -> Decimal {
        self.basic_salary + self.total_allowances()
    }
}

fn default_late_deduction_rate() -> Decimal {
    Decimal::new(500, 0)
}

fn default_absent_deduction_rate() -> Decimal {
    Decimal::new(1000, 0)
}

/// Lifecycle state of a payroll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayrollStatus {
    /// Editable; reprocessing replaces all records.
    Draft,
    /// Terminal; records are immutable.
    Approved,
}

/// Snapshot of one employee's pay for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee.
    pub employee_id: String,
    /// Employee name at processing time.
    pub employee_name: String,
    /// Monthly basic salary.
    pub basic_salary: Decimal,
    /// Housing allowance.
    pub housing_allowance: Decimal,
    /// Transport allowance.
    pub transport_allowance: Decimal,
    /// Medical allowance.
    pub medical_allowance: Decimal,
    /// Utility allowance.
    pub utility_allowance: Decimal,
    /// Other allowances.
    pub other_allowances: Decimal,
    /// Sum of the five allowances.
    pub total_allowances: Decimal,
    /// Basic salary plus allowances.
    pub gross_salary: Decimal,
    /// Lateness share of the attendance deduction.
    pub late_deductions: Decimal,
    /// Absence share of the attendance deduction.
    pub absent_deductions: Decimal,
    /// Late plus absent deductions.
    pub attendance_deduction: Decimal,
    /// PAYE tax for the month.
    pub tax_deduction: Decimal,
    /// Gross minus late, absent and tax deductions.
    pub net_salary: Decimal,
    /// How the figures were derived.
    pub audit_steps: Vec<AuditStep>,
    /// Soft anomalies found while computing this record.
    pub warnings: Vec<AuditWarning>,
}

/// Aggregate figures of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Number of records.
    pub headcount: usize,
    /// Sum of gross salaries.
    pub gross: Decimal,
    /// Sum of attendance deductions.
    pub attendance_deductions: Decimal,
    /// Sum of tax deductions.
    pub tax: Decimal,
    /// Sum of net salaries.
    pub net: Decimal,
}

/// The payroll run of one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier for the run.
    pub id: Uuid,
    /// The month paid.
    pub month: Month,
    /// Lifecycle state.
    pub status: PayrollStatus,
    /// One record per processed employee, ordered by employee id.
    pub records: Vec<PayrollRecord>,
    /// Employees left out of the run.
    pub skipped: Vec<SkippedEmployee>,
    /// Engine version that produced the records.
    pub engine_version: String,
    /// When the run was first created.
    pub created_at: DateTime<Utc>,
    /// When the records were last computed.
    pub processed_at: DateTime<Utc>,
    /// When the run was approved.
    pub approved_at: Option<DateTime<Utc>>,
}

impl PayrollRun {
    /// Returns true if the run can no longer change.
    pub fn is_approved(&self) -> bool {
        self.status == PayrollStatus::Approved
    }

    /// Sums the run's records.
    pub fn totals(&self) -> PayrollTotals {
        self.records
            .iter()
            .fold(PayrollTotals::default(), |mut totals, record| {
                totals.headcount += 1;
                totals.gross += record.gross_salary;
                totals.attendance_deductions += record.attendance_deduction;
                totals.tax += record.tax_deduction;
                totals.net += record.net_salary;
                totals
            })
    }
}
