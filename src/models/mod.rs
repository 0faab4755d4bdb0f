//! Core data models for the Settlement Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance;
mod audit;
mod kpi;
mod month;
mod organization;
mod payroll;
mod performance;
mod reference;
mod shift_policy;

pub use attendance::{
    AttendanceEntry, AttendanceRecord, AttendanceSource, BranchUploadStatus, DailyClassification,
    DailyOutcome, DisciplinaryAction, DisciplinaryActionType, MonthlyAttendanceSummary,
};
pub use audit::{AuditStep, AuditWarning, SkippedEmployee, WarningSeverity};
pub use kpi::{EmployeeKpiEntry, KpiLine, KpiScore, KpiTemplate, KpiTemplateItem};
pub use month::Month;
pub use organization::{Branch, Department, Employee, EmploymentStatus, JobRole};
pub use payroll::{PayrollRecord, PayrollRun, PayrollStatus, PayrollTotals, SalaryStructure};
pub use performance::{PerformanceSummary, ProbationStatus};
pub use reference::{OrganizationData, ReferenceData};
pub use shift_policy::{ShiftPolicy, WorkDaysType};
